use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use greeting_slides::app::{AppContext, static_fallback};
use greeting_slides::config::{LetterConfig, SlideConfig};
use greeting_slides::constants::*;
use greeting_slides::content::Customization;
use greeting_slides::render::console;
use greeting_slides::sequencer::Pacing;
use greeting_slides::stage::{MountOptions, Stage};

fn millis(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

#[derive(Parser, Debug)]
#[command(version, about = "Greeting slides followed by a typed letter")]
struct Args {
    /// Customization record (JSON): messages, letterText, signature, lastModified
    #[arg(long)]
    content: Option<PathBuf>,

    /// Slide enter/exit animation
    #[arg(long, default_value_t = millis(SLIDE_TRANSITION))]
    transition_ms: u64,
    /// Hold between one slide and the next
    #[arg(long, default_value_t = millis(SLIDE_DELAY))]
    slide_delay_ms: u64,
    /// Pause after the last slide before the letter is released
    #[arg(long, default_value_t = millis(COMPLETION_DELAY))]
    completion_delay_ms: u64,
    #[arg(long, default_value_t = millis(HIDE_DELAY))]
    hide_delay_ms: u64,
    #[arg(long, default_value_t = millis(WORD_DELAY))]
    word_delay_ms: u64,
    #[arg(long, default_value_t = millis(PARAGRAPH_DELAY))]
    paragraph_delay_ms: u64,
    #[arg(long, default_value_t = millis(ENTRANCE_DELAY))]
    entrance_delay_ms: u64,
    #[arg(long, default_value_t = millis(SIGNATURE_DELAY))]
    signature_delay_ms: u64,
    /// How long the headless run stays up after the letter is signed
    #[arg(long, default_value_t = millis(EXIT_LINGER))]
    linger_ms: u64,

    /// Shorter timings, no typing animation and no particles
    #[arg(long)]
    reduced_motion: bool,
    #[arg(long)]
    no_particles: bool,
    /// Wait for Space before the slides start
    #[arg(long)]
    no_autostart: bool,
    #[arg(long)]
    no_progress: bool,
    /// Leave the slide container out
    #[arg(long)]
    no_slides: bool,
    /// Leave the letter container out
    #[arg(long)]
    no_letter: bool,

    /// Open a raylib window instead of printing to the terminal
    #[cfg(feature = "window")]
    #[arg(long)]
    window: bool,
}

impl Args {
    fn slide_config(&self, content: &Customization) -> SlideConfig {
        SlideConfig {
            messages: content.messages.clone(),
            pacing: Pacing {
                transition: Duration::from_millis(self.transition_ms),
                item_delay: Duration::from_millis(self.slide_delay_ms),
                completion_delay: Duration::from_millis(self.completion_delay_ms),
            },
            hide_delay: Duration::from_millis(self.hide_delay_ms),
            autostart: !self.no_autostart,
            reduced_motion: self.reduced_motion,
        }
    }

    fn letter_config(&self, content: &Customization) -> LetterConfig {
        LetterConfig {
            paragraphs: content.paragraphs(),
            signature: content.signature(),
            word_delay: Duration::from_millis(self.word_delay_ms),
            paragraph_delay: Duration::from_millis(self.paragraph_delay_ms),
            entrance_delay: Duration::from_millis(self.entrance_delay_ms),
            signature_delay: Duration::from_millis(self.signature_delay_ms),
            reduced_motion: self.reduced_motion,
            particles: !self.no_particles,
            ..LetterConfig::default()
        }
    }

    fn mount_options(&self) -> MountOptions {
        MountOptions {
            slides: !self.no_slides,
            letter: !self.no_letter,
            progress: !self.no_progress,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let content = match args.content.as_deref() {
        Some(path) => Customization::load(path).unwrap_or_else(|error| {
            warn!(path = %path.display(), %error, "using the default greeting");
            Customization::default()
        }),
        None => Customization::default(),
    };

    let slides = args.slide_config(&content);
    let letter = args.letter_config(&content);
    let stage = Stage::new(RENDER_WIDTH as f32, RENDER_HEIGHT as f32);
    let mounts = stage.mount(&slides, &letter, args.mount_options());

    let app = match AppContext::new(slides, letter, mounts) {
        Ok(app) => app,
        Err(error) => {
            error!(%error, "startup failed; showing the static greeting");
            print!("{}", static_fallback(&content));
            return Ok(());
        }
    };

    #[cfg(feature = "window")]
    if args.window {
        return greeting_slides::render::window::run(app);
    }

    console::run(app, Duration::from_millis(args.linger_ms)).await
}
