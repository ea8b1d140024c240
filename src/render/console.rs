//! Headless presenter: prints slides as they enter and types the letter into the terminal.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::time::{self, MissedTickBehavior};
use tracing::info;

use crate::app::AppContext;
use crate::constants::FRAME_TIME;
use crate::events::SequenceSummary;
use crate::letter::{LetterPhase, LetterRevealer, LetterSheet, SIGNATURE_MARK};

/// Writes whatever changed on screen since the previous frame.
pub struct ConsolePrinter<W: Write> {
    out: W,
    slide: Option<usize>,
    letter_open: bool,
    paragraph: usize,
    typed: String,
    closing: bool,
    name: bool,
    mark: bool,
}

impl<W: Write> ConsolePrinter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            slide: None,
            letter_open: false,
            paragraph: 0,
            typed: String::new(),
            closing: false,
            name: false,
            mark: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn slides_done(&mut self, summary: SequenceSummary) -> io::Result<()> {
        writeln!(
            self.out,
            "  ~ {} slides in {:.1}s ~",
            summary.item_count,
            summary.duration_ms as f64 / 1000.0
        )?;
        self.out.flush()
    }

    pub fn render(&mut self, app: &AppContext) -> io::Result<()> {
        if let Some(slides) = app.slides() {
            let index = slides.current_index();
            if index != self.slide {
                let entered = index.and_then(|index| Some((index, slides.messages().get(index)?)));
                if let Some((index, message)) = entered {
                    writeln!(self.out, "  [{}/{}] {}", index + 1, slides.messages().len(), message)?;
                }
                self.slide = index;
            }
        }

        if let Some(letter) = app.letter() {
            self.render_letter(letter)?;
        }
        self.out.flush()
    }

    fn render_letter(&mut self, letter: &LetterRevealer<LetterSheet>) -> io::Result<()> {
        let sheet = letter.surface();
        if letter.phase() == LetterPhase::Hidden {
            if self.letter_open {
                self.close_letter();
            }
            return Ok(());
        }
        // Replayed or replaced between two frames.
        if self.letter_open && self.regressed(sheet) {
            self.close_letter();
        }
        if !self.letter_open {
            if !sheet.visible && letter.phase() != LetterPhase::Complete {
                return Ok(());
            }
            writeln!(self.out)?;
            self.letter_open = true;
        }

        let views = sheet.paragraphs();
        while let Some(view) = views.get(self.paragraph) {
            let shown = view.text.split_whitespace().collect::<Vec<_>>().join(" ");
            if let Some(rest) = shown.strip_prefix(self.typed.as_str()) {
                write!(self.out, "{rest}")?;
                self.typed = shown;
            }
            if !view.complete {
                return Ok(());
            }
            writeln!(self.out)?;
            writeln!(self.out)?;
            self.typed.clear();
            self.paragraph += 1;
        }

        let signature = sheet.signature();
        if signature.closing_shown && !self.closing {
            writeln!(self.out, "    {}", signature.closing)?;
            self.closing = true;
        }
        if signature.name_shown && !self.name {
            write!(self.out, "    {}", signature.name)?;
            self.name = true;
        }
        if signature.mark_shown && !self.mark {
            writeln!(self.out, " {SIGNATURE_MARK}")?;
            self.mark = true;
        }
        Ok(())
    }

    fn regressed(&self, sheet: &LetterSheet) -> bool {
        let views = sheet.paragraphs();
        if self.paragraph > 0 {
            return views.first().is_none_or(|view| !view.complete);
        }
        let current = views
            .first()
            .map(|view| view.text.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        !current.starts_with(self.typed.as_str()) || (self.mark && !sheet.signature().mark_shown)
    }

    fn close_letter(&mut self) {
        self.letter_open = false;
        self.paragraph = 0;
        self.typed.clear();
        self.closing = false;
        self.name = false;
        self.mark = false;
    }
}

/// Drives `app` in real time until it finishes (plus `linger`) or Ctrl-C.
pub async fn run(mut app: AppContext, linger: Duration) -> anyhow::Result<()> {
    // No keyboard here, so held-back slides start right away.
    app.start();
    let mut printer = ConsolePrinter::new(io::stdout());
    let mut slides_done = app.bus().subscribe();
    let mut ticker = time::interval(FRAME_TIME);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut last = ticker.tick().await;
    let mut finished_at = None;
    loop {
        let now = tokio::select! {
            now = ticker.tick() => now,
            result = &mut ctrl_c => {
                result.context("failed to listen for Ctrl-C")?;
                info!("interrupted");
                break;
            }
        };
        app.update(now - last);
        last = now;

        if let Some(summary) = slides_done.poll() {
            printer.slides_done(summary)?;
        }
        printer.render(&app)?;

        if !app.is_finished() {
            finished_at = None;
            continue;
        }
        let since = *finished_at.get_or_insert(now);
        if now - since >= linger {
            info!("greeting shown; exiting");
            break;
        }
    }
    Ok(())
}
