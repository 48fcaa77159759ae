use std::io::{self, BufRead, Write};
use std::path::PathBuf;
#[cfg(feature = "playback")]
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use interval_trainer::dsp::oscillator::Waveform;
use interval_trainer::dsp::renderer::{render_plan, write_wav};
use interval_trainer::error::TrialError;
use interval_trainer::playback::{PlaybackMode, PlaybackPlan};
#[cfg(feature = "playback")]
use interval_trainer::playback::{PlaybackWorker, RodioOutput};
use interval_trainer::settings::Settings;
use interval_trainer::theory::{self, IntervalSet, INTERVALS};
use interval_trainer::trial::{Score, Session};

/// Interval ear trainer: listen to two notes and name the interval.
#[derive(Parser, Debug)]
#[command(name = "interval-trainer")]
#[command(version, about = "Interval ear-training quiz")]
struct Args {
    /// Tone colour: sine, triangle, sawtooth or square
    #[arg(short, long)]
    waveform: Option<Waveform>,

    /// ascending, descending or harmonic
    #[arg(short, long)]
    mode: Option<PlaybackMode>,

    /// Intervals to practise, e.g. "all", "1-4,P5" or "m3,M3"
    #[arg(short, long)]
    intervals: Option<IntervalSet>,

    /// Settings file (JSON). Defaults to the platform config directory.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    save_settings: bool,

    /// Seed for a reproducible question sequence
    #[arg(long)]
    seed: Option<u64>,

    /// Write each question's audio to this WAV file instead of playing it
    #[arg(long)]
    wav_out: Option<PathBuf>,
}

enum Output {
    #[cfg(feature = "playback")]
    Device(PlaybackWorker),
    File(PathBuf),
}

impl Output {
    fn open(wav_out: Option<PathBuf>) -> anyhow::Result<Self> {
        if let Some(path) = wav_out {
            return Ok(Output::File(path));
        }
        #[cfg(feature = "playback")]
        {
            let worker = PlaybackWorker::spawn(RodioOutput::open)?;
            Ok(Output::Device(worker))
        }
        #[cfg(not(feature = "playback"))]
        {
            anyhow::bail!("built without audio playback; pass --wav-out <FILE>")
        }
    }

    fn play(&self, plan: &PlaybackPlan, waveform: Waveform) -> anyhow::Result<()> {
        match self {
            #[cfg(feature = "playback")]
            Output::Device(worker) => {
                if !worker.play(plan, waveform)? {
                    println!("(still playing, try again in a moment)");
                }
            }
            Output::File(path) => {
                let pcm = render_plan(plan, waveform)?;
                write_wav(path, &pcm)?;
                println!("Audio written to {}", path.display());
            }
        }
        Ok(())
    }

    fn finish(&self) {
        #[cfg(feature = "playback")]
        if let Output::Device(worker) = self {
            worker.wait_idle(Duration::from_secs(3));
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config_path = args.config.clone().or_else(Settings::default_path);
    let mut settings = match &config_path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(w) = args.waveform {
        settings.waveform = w;
    }
    if let Some(m) = args.mode {
        settings.mode = m;
    }
    if let Some(i) = args.intervals.clone() {
        settings.intervals = i;
    }
    if args.save_settings {
        let path = config_path
            .as_deref()
            .context("no settings location available; pass --config")?;
        settings.save(path)?;
        log::info!("settings saved to {}", path.display());
    }

    let mut session = match args.seed {
        Some(seed) => Session::seeded(seed),
        None => Session::new(),
    };
    let output = Output::open(args.wav_out)?;

    print_help(&settings);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let (command, rest) = match line.trim().split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line.trim(), ""),
        };

        match command {
            "" | "n" | "new" => match session.start_trial(&settings.intervals) {
                Ok(trial) => {
                    println!("Listen...");
                    let plan = trial.plan(settings.mode, &settings.timing);
                    output.play(&plan, settings.waveform)?;
                }
                Err(TrialError::NoIntervalsSelected) => {
                    println!("Select at least one interval first (set <intervals>).");
                }
                Err(e) => return Err(e.into()),
            },
            "r" | "replay" => {
                if let Some((root, target)) = session.replay() {
                    let plan = PlaybackPlan::for_pair(root, target, settings.mode, &settings.timing);
                    output.play(&plan, settings.waveform)?;
                }
            }
            "s" | "score" => println!("{}", format_score(session.score())),
            "wave" => match rest.parse::<Waveform>() {
                Ok(w) => {
                    settings.waveform = w;
                    println!("Waveform: {w}");
                }
                Err(e) => println!("{e}"),
            },
            "mode" => match rest.parse::<PlaybackMode>() {
                Ok(m) => {
                    settings.mode = m;
                    println!("Mode: {m}");
                }
                Err(e) => println!("{e}"),
            },
            "set" => match rest.parse::<IntervalSet>() {
                Ok(set) => {
                    println!("Practising: {set}");
                    settings.intervals = set;
                }
                Err(e) => println!("{e}"),
            },
            "h" | "help" | "?" => print_help(&settings),
            "q" | "quit" | "exit" => break,
            answer => match theory::parse_interval(answer) {
                Ok(guess) => match session.submit_answer(guess) {
                    Ok(verdict) if verdict.correct => {
                        println!("Correct! {} ({})", verdict.answer_name, verdict.answer_symbol);
                        println!("{}", format_score(session.score()));
                    }
                    Ok(verdict) => {
                        println!(
                            "Wrong. The answer was {} ({})",
                            verdict.answer_name, verdict.answer_symbol
                        );
                        println!("{}", format_score(session.score()));
                    }
                    Err(TrialError::NoActiveTrial) => {}
                    Err(e) => return Err(e.into()),
                },
                Err(e) => println!("{e} (type 'help' for commands)"),
            },
        }
    }

    output.finish();
    println!("{}", format_score(session.score()));
    Ok(())
}

fn format_score(score: Score) -> String {
    match score.accuracy_percent() {
        Some(pct) => format!("Score: {} / {} ({pct}%)", score.correct, score.total),
        None => format!("Score: {} / {}", score.correct, score.total),
    }
}

fn print_help(settings: &Settings) {
    println!(
        "Waveform: {}  Mode: {}  Practising: {}",
        settings.waveform, settings.mode, settings.intervals
    );
    println!("Commands: <enter>/n new question, r replay, s score, q quit");
    println!("          wave <waveform>, mode <mode>, set <intervals>");
    println!("Answer with the semitone count or symbol:");
    for i in INTERVALS.iter() {
        println!("  {:>2}  {:<3} {}", i.semitones, i.symbol, i.name);
    }
}
