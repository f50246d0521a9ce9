// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Solidcast CLI

use clap::Parser;
use colored::Colorize;
use solidcast::render::{Camera, Projection};
use solidcast::{run, RenderMode, RunConfig};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "solidcast")]
#[command(about = "Solidcast - batch geometry script evaluation and export", long_about = None)]
#[command(version)]
struct Cli {
    /// Input script file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file; the suffix selects the format
    /// (stl, off, amf, dxf, svg, csg, ast, term, echo, png)
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Write a build-dependency rule for the output file
    #[arg(short = 'd', long = "deps", value_name = "FILE")]
    deps: Option<PathBuf>,

    /// Add a variable definition, repeatable
    #[arg(short = 'D', value_name = "VAR=VAL")]
    define: Vec<String>,

    /// For png output, do a full geometry render
    #[arg(long, conflicts_with = "preview")]
    render: bool,

    /// For png output, render a preview; pass "throwntogether" for the fast
    /// approximate variant
    #[arg(long, value_name = "MODE", num_args = 0..=1, default_missing_value = "accurate")]
    preview: Option<String>,

    /// Camera placement: tx,ty,tz,rx,ry,rz,dist or ex,ey,ez,cx,cy,cz
    #[arg(long, value_name = "PARAMS")]
    camera: Option<String>,

    /// Raster image size
    #[arg(long, value_name = "W,H")]
    imgsize: Option<String>,

    /// (o)rtho or (p)erspective projection for png output
    #[arg(long, value_name = "O|P")]
    projection: Option<String>,

    /// Adjust camera to look at object center
    #[arg(long)]
    autocenter: bool,

    /// Adjust camera to fit the whole object
    #[arg(long)]
    viewall: bool,
}

fn main() {
    let cli = Cli::parse();

    let camera = match build_camera(&cli) {
        Ok(camera) => camera,
        Err(message) => fail(&message),
    };

    let render_mode = if cli.render {
        RenderMode::Full
    } else if cli.preview.as_deref() == Some("throwntogether") {
        RenderMode::ThrownTogether
    } else {
        RenderMode::Preview
    };

    let definitions = cli
        .define
        .iter()
        .map(|d| format!("{};", d))
        .collect::<Vec<_>>()
        .join("\n");

    let config = RunConfig {
        input: cli.input,
        output: cli.output,
        deps_output: cli.deps,
        definitions,
        render_mode,
        camera,
    };

    if let Err(error) = run(&config) {
        fail(&error.to_string());
    }
}

fn build_camera(cli: &Cli) -> Result<Camera, String> {
    let mut camera = Camera::default();

    if let Some(placement) = &cli.camera {
        camera.kind = Camera::parse_placement(placement)?;
        camera.explicit = true;
    }

    if let Some(imgsize) = &cli.imgsize {
        let parts: Vec<&str> = imgsize.split(',').collect();
        let parsed: Option<(u32, u32)> = match parts.as_slice() {
            [w, h] => w
                .trim()
                .parse()
                .ok()
                .zip(h.trim().parse().ok()),
            _ => None,
        };
        match parsed {
            Some((w, h)) if w > 0 && h > 0 => {
                camera.width = w;
                camera.height = h;
            }
            _ => return Err("imgsize requires two positive numbers".to_string()),
        }
    }

    if let Some(projection) = &cli.projection {
        camera.projection = match projection.as_str() {
            "o" | "ortho" | "orthogonal" => Projection::Orthographic,
            "p" | "perspective" => Projection::Perspective,
            _ => return Err("projection needs to be 'o' or 'p' for ortho or perspective".into()),
        };
    }

    camera.autocenter = cli.autocenter;
    camera.viewall = cli.viewall;

    Ok(camera)
}

fn fail(message: &str) -> ! {
    eprintln!("{} {}", "ERROR:".red().bold(), message);
    process::exit(1);
}
