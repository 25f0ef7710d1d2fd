// synthwave -- a tone and chord player
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! `synthwave` plays notes and chords, one action per argument.

use synthwave::play;

fn main() {
    if let Err(err) = play::play_main() {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
