// synthwave -- a tone and chord player
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Easy interface for getting sound to play using a sox subprocess.

use std::io;
use std::io::Write;
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};

use log::debug;

use crate::wave::AudioBuffer;

pub enum SoxTarget<'a> {
    /// Play on the default speakers.
    Play,
    /// Write to a file in any sox-supported format, derived from the extension.
    File(&'a Path),
}

/// Streams rendered buffers into `play` or `sox`.
pub struct SoxSink {
    player: Child,
    audio_stream: Option<ChildStdin>,
    buffer: Vec<u8>,
}

impl SoxSink {
    pub fn new(sample_rate: u32, target: SoxTarget) -> io::Result<Self> {
        let sample_rate_str = format!("{}", sample_rate);
        let input_args = &[
            "-R", // make the output reproducible
            "--channels",
            "2",
            "--rate",
            &sample_rate_str,
            "--type",
            "f64",
            "/dev/stdin",
        ];

        // For properly recording the sox dependency on nix:
        let (play, sox) = if let Some(sox_bin) = option_env!("NIX_SOX_BIN") {
            debug!("using sox from nix store {}", sox_bin);
            let play = Path::new(sox_bin).join("play");
            let sox = Path::new(sox_bin).join("sox");
            (play, sox)
        } else {
            ("play".into(), "sox".into())
        };

        let mut player = match target {
            SoxTarget::Play => Command::new(&play)
                .args(input_args)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()?,
            SoxTarget::File(outfile) => Command::new(&sox)
                .args(input_args)
                .arg(outfile)
                .stdin(Stdio::piped())
                .spawn()?,
        };

        let audio_stream = player
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "sox has no stdin"))?;

        Ok(Self {
            player,
            audio_stream: Some(audio_stream),
            buffer: Vec::new(),
        })
    }

    /// Write all samples of the buffer to the sox stream.
    pub fn write(&mut self, audio: &AudioBuffer) -> io::Result<()> {
        let stream = self
            .audio_stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "sox stream closed"))?;
        if self.buffer.len() < audio.byte_len() {
            self.buffer.resize(audio.byte_len(), 0);
        }
        audio.copy_bytes_to(&mut self.buffer);
        stream.write_all(&self.buffer[..audio.byte_len()])?;
        stream.flush()
    }

    /// Close the stream and wait for sox to drain it.
    pub fn finish(mut self) -> io::Result<()> {
        // sox exits on its own once the input stream is closed
        drop(self.audio_stream.take());
        let status = self.player.wait()?;
        debug!("sox exited with {}", status);
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("sox exited with {}", status),
            ))
        }
    }
}
