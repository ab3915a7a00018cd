// SPDX-License-Identifier: MIT
//
// n-term: terminal engine for n-2048.
//
// The heart of the crate is escape-aware line diffing. Frames are lists of
// strings with SGR styling embedded in them; between two frames, only the
// visible columns that changed are rewritten, and each rewrite carries
// enough styling to look right on its own. Around that sit the pieces any
// full-screen terminal program needs: raw mode, the alternate screen, a
// background stdin reader, a key parser, and a 120 Hz event loop.
//
// No TUI framework underneath: direct ANSI escape sequences and raw termios.

pub mod ansi;
pub mod color;
pub mod diff;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod reader;
pub mod renderer;
pub mod tag;
pub mod terminal;
