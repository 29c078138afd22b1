// Copyright (c) 2026 rezky_nightky

mod animate;
mod cell;
mod compositor;
mod config;
mod damping;
mod diffusion;
mod error;
mod frame;
mod grid;
mod headless;
mod logging;
mod palette;
mod phase;
mod sim;
mod terminal;

use std::env;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use tracing::info;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::animate::{Animator, TransitionStyle};
use crate::config::{color_enabled_stdout, default_params_usage_for_help, Args, RunConfig};
use crate::frame::Frame;
use crate::grid::Grid;
use crate::logging::LogTarget;
use crate::phase::PhaseEvent;
use crate::sim::Simulation;
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

fn build_info() -> String {
    let sha = env!("GLYPHDRIFT_GIT_SHA");
    if sha.is_empty() {
        env!("GLYPHDRIFT_BUILD").to_string()
    } else {
        format!("{} ({})", env!("GLYPHDRIFT_BUILD"), sha)
    }
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn install_exit_handlers() {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }
}

fn parse_args() -> Args {
    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }

    let matches = cmd.get_matches_from(env::args_os());
    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn main() -> std::io::Result<()> {
    install_exit_handlers();

    let args = parse_args();

    if args.list_palettes {
        palette::print_list_palettes();
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    let result = args.run_config().and_then(|cfg| {
        if args.headless {
            run_headless(&args, &cfg)
        } else {
            run_interactive(&args, &cfg)
        }
    });

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run_headless(args: &Args, cfg: &RunConfig) -> error::Result<()> {
    match &args.log_file {
        Some(path) => logging::init(LogTarget::File(path))?,
        None => logging::init(LogTarget::Stderr)?,
    }
    let sim = headless::simulate(cfg, args.size)?;
    print!("{}", headless::render(&sim));
    Ok(())
}

fn run_interactive(args: &Args, cfg: &RunConfig) -> error::Result<()> {
    match &args.log_file {
        Some(path) => logging::init(LogTarget::File(path))?,
        None => logging::init(LogTarget::Off)?,
    }

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;
    let (rows, cols) = Grid::dimensions_for(w as u32, h as u32, cfg.pitch)?;
    let mut sim = Simulation::new(rows, cols, cfg.sim.clone())?;

    let drift = TransitionStyle::drift(cfg.drift);
    let reveal = TransitionStyle::reveal(cfg.reveal);

    let start = Instant::now();
    let mut animator = Animator::new(&sim.grid().rendered(), drift, start, cfg.color)
        .with_pitch(cfg.pitch as usize);
    let mut frame = Frame::new(w, h);
    animator.render_all(&mut frame, start);
    term.draw(&mut frame)?;

    let end_time = cfg.duration.map(|d| start + d);
    let mut next_frame = start + cfg.tick;
    let mut running = true;

    info!(
        width = w,
        height = h,
        rows,
        cols,
        tick_ms = cfg.tick.as_secs_f64() * 1000.0,
        "interactive run started"
    );

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut redraw_all = false;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(..) => redraw_all = true,
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if args.screensaver {
                            running = false;
                            break;
                        }
                        match (k.code, k.modifiers) {
                            (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => running = false,
                            (KeyCode::Char('c'), KeyModifiers::CONTROL) => running = false,
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }

            if !running || redraw_all {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }

            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !running {
            break;
        }

        let now = Instant::now();
        let tick = sim.tick(now.saturating_duration_since(start));
        for d in &tick.reveal {
            animator.request(d.row, d.col, d.ch, reveal, now);
        }
        for d in &tick.drift {
            animator.request(d.row, d.col, d.ch, drift, now);
        }
        if tick.events.contains(&PhaseEvent::Frozen) {
            info!(
                ticks = sim.ticks(),
                revealed = tick.reveal.len(),
                "text revealed; press q to exit"
            );
        }

        if redraw_all {
            frame.mark_all_dirty();
            animator.render_all(&mut frame, now);
        } else if animator.is_animating() {
            animator.render(&mut frame, now);
        }
        if frame.has_changes() {
            term.draw(&mut frame)?;
        }

        next_frame += cfg.tick;
        if now > next_frame {
            next_frame = now;
        }
    }

    info!(ticks = sim.ticks(), phase = ?sim.phase(), "interactive run finished");
    Ok(())
}
