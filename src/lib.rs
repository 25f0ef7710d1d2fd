// synthwave -- a tone and chord player
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

pub mod automation;
pub mod control;
pub mod graph;
pub mod note;
pub mod play;
pub mod presets;
pub mod synth;
pub mod wave;

// Utility modules
pub mod util;
