// SPDX-License-Identifier: MIT
//
// n-term demo: a live key viewer on top of the line renderer.
//
// This wires the complete pipeline: Terminal → StdinReader → Parser →
// Events → styled lines → line diff → single write(). Press keys and watch
// only the changed columns being rewritten; the footer shows what the last
// frame cost. Ctrl-Q to quit.
//
// Usage:
//   cargo run -p n-term --example demo

use std::collections::VecDeque;

use n_term::ansi::paint_fg;
use n_term::color::Rgb;
use n_term::event_loop::{Action, App, EventLoop};
use n_term::input::Event;

/// Key log lines kept on screen.
const LOG_ROWS: usize = 12;

/// Visible width of every frame line.
const WIDTH: usize = 48;

const ACCENT: Rgb = Rgb(0x46, 0x99, 0x90);
const DIM: Rgb = Rgb(0x80, 0x80, 0x80);

struct Demo {
    log: VecDeque<String>,
    count: u64,
}

impl Demo {
    fn new() -> Self {
        Self {
            log: VecDeque::with_capacity(LOG_ROWS),
            count: 0,
        }
    }
}

impl App for Demo {
    fn on_event(&mut self, event: &Event) -> Action {
        let Event::Key(key) = event;
        if key.is_ctrl('q') {
            return Action::Quit;
        }

        self.count += 1;
        if self.log.len() == LOG_ROWS {
            self.log.pop_front();
        }
        self.log.push_back(format!("{:?} {:?}", key.code, key.modifiers));
        Action::Continue
    }

    fn paint(&mut self) -> Vec<String> {
        let mut lines = Vec::with_capacity(LOG_ROWS + 2);
        lines.push(format!(
            "{}{}",
            paint_fg("n-term demo", ACCENT),
            pad_to(&format!("  {} keys", self.count), WIDTH - 11)
        ));

        for row in 0..LOG_ROWS {
            let text = self.log.get(row).map_or("", String::as_str);
            let color = if row + 1 == self.log.len() { ACCENT } else { DIM };
            lines.push(paint_fg(&pad_to(text, WIDTH), color));
        }

        lines.push(pad_to("Ctrl-Q quits", WIDTH));
        lines
    }
}

fn pad_to(text: &str, width: usize) -> String {
    let cut: String = text.chars().take(width).collect();
    format!("{cut:<width$}")
}

fn main() -> std::io::Result<()> {
    let mut event_loop = EventLoop::new();
    event_loop.run(&mut Demo::new())
}
