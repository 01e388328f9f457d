//! A virtual keyboard in the terminal.
//!
//! Click keys with the mouse, or pass `--nav` and use the arrow keys and
//! enter. Esc quits. With `--type`, the keyboard runs headless: the given
//! text is typed by tapping the matching keys and the result is printed.

/// Terminal canvas and event translation.
mod term;

use std::{cell::RefCell, fs::File, io, panic, rc::Rc, sync::Mutex};

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::{ExecutableCommand, cursor as ccursor, event as cevent, terminal};
use scopeguard::defer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vkeyboard::{
    Canvas, Color, Expanse, KeyKind, Keyboard, Layout, Point, Rect, Theme, presets,
};

use term::{CellCanvas, CellMeasure, translate_event};

/// Gap between keys, in cells.
const PADDING: u32 = 1;

/// Command-line options.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Layout preset: azerty, qwerty or number.
    #[arg(long, default_value = "azerty")]
    layout: String,

    /// Theme: default or dark.
    #[arg(long, default_value = "dark")]
    theme: String,

    /// Navigate with the arrow keys and type with enter.
    #[arg(long)]
    nav: bool,

    /// Show a text box above the keys.
    #[arg(long)]
    text_box: bool,

    /// Key height in rows.
    #[arg(long, default_value_t = 3)]
    key_height: u32,

    /// Type this text without a terminal and print the result.
    #[arg(long = "type", value_name = "TEXT")]
    type_text: Option<String>,

    /// Write logs to this file. Filter with RUST_LOG.
    #[arg(long, value_name = "PATH")]
    log: Option<String>,
}

/// Build a layout whose keys span the full terminal width.
fn fit_layout(model: &[&str], size: Expanse, key_height: u32) -> Result<Layout> {
    let basis = Layout::builder(model).padding(PADDING).build()?.basis() as u32;
    let key_w = size.w.saturating_sub(PADDING * (basis + 1)) / basis;
    Ok(Layout::builder(model)
        .padding(PADDING)
        .min_key_size(1)
        .key_size((key_w, key_height))
        .build()?)
}

/// Construct the keyboard for a terminal of the given size.
fn build_keyboard(args: &Args, size: Expanse, text: Rc<RefCell<String>>) -> Result<Keyboard> {
    let model = presets::by_name(&args.layout)
        .with_context(|| format!("unknown layout {:?}", args.layout))?;
    let theme =
        Theme::by_name(&args.theme).with_context(|| format!("unknown theme {:?}", args.theme))?;
    let kb = Keyboard::builder(size)
        .layout(fit_layout(model, size, args.key_height)?)
        .special_layout(fit_layout(presets::SPECIAL, size, args.key_height)?)
        .renderer(theme)
        .measure(CellMeasure)
        .show_text_box(args.text_box)
        .navigation(args.nav)
        .consumer(move |t| *text.borrow_mut() = t.to_owned())
        .build()?;
    Ok(kb)
}

/// Tap the key at `p`.
fn tap(kb: &mut Keyboard, p: Point) {
    kb.press(p);
    kb.release(p);
}

/// Centre of the first key of a kind, optionally with a specific value.
fn find(kb: &Keyboard, kind: KeyKind, value: Option<char>) -> Option<Point> {
    kb.keys()
        .iter()
        .find(|k| k.spec.kind == kind && (value.is_none() || k.spec.value == value))
        .map(|k| k.rect.center())
}

/// Type `text` by tapping keys, switching variants as needed.
fn type_text(kb: &mut Keyboard, text: &str) -> Result<()> {
    for c in text.chars() {
        let target = if c == ' ' {
            (KeyKind::Space, None)
        } else {
            (KeyKind::Character, Some(c))
        };
        let mut typed = false;
        for attempt in 0..4 {
            if let Some(p) = find(kb, target.0, target.1) {
                tap(kb, p);
                typed = true;
                break;
            }
            let toggle = if attempt % 2 == 0 {
                KeyKind::UppercaseToggle
            } else {
                KeyKind::SpecialToggle
            };
            if let Some(p) = find(kb, toggle, None) {
                tap(kb, p);
            }
        }
        if !typed {
            bail!("no key types {c:?}");
        }
    }
    Ok(())
}

/// Set up logging to a file, if requested.
fn init_logging(path: Option<&str>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {path}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Run without a terminal.
fn headless(args: &Args, text: &str) -> Result<()> {
    let typed = Rc::new(RefCell::new(String::new()));
    let mut kb = build_keyboard(args, Expanse::new(120, 40), Rc::clone(&typed))?;
    kb.enable();
    type_text(&mut kb, text)?;
    let mut canvas = CellCanvas::new(Expanse::new(120, 40));
    kb.draw(&mut canvas)?;
    println!("{}", typed.borrow());
    Ok(())
}

/// Draw pending changes and the status line.
fn render(
    kb: &mut Keyboard,
    canvas: &mut CellCanvas,
    typed: &str,
    out: &mut impl io::Write,
) -> Result<()> {
    let mut rects = kb.draw(canvas)?;
    if kb.text_box_rect().is_none() {
        let status = Rect::new(0, 0, canvas.size().w, 1);
        canvas.fill_rect(status, Color::new(0, 0, 0))?;
        canvas.draw_text(Point::zero(), typed, 1, Color::new(255, 255, 255))?;
        rects.push(status);
    }
    canvas.flush(out, &rects)?;
    Ok(())
}

/// Leave the alternate screen and raw mode.
fn restore_terminal() {
    let mut stderr = io::stderr();
    #[allow(unused_must_use)]
    {
        crossterm::execute!(
            stderr,
            terminal::LeaveAlternateScreen,
            cevent::DisableMouseCapture,
            ccursor::Show
        );
        terminal::disable_raw_mode();
    }
}

/// Run the interactive terminal loop.
fn interactive(args: &Args) -> Result<()> {
    let (w, h) = terminal::size()?;
    let size = Expanse::new(u32::from(w), u32::from(h));
    let typed = Rc::new(RefCell::new(String::new()));
    let mut kb = build_keyboard(args, size, Rc::clone(&typed))?;
    let mut canvas = CellCanvas::new(size);
    let mut adapter = kb.adapter();

    let mut stderr = io::stderr();
    terminal::enable_raw_mode()?;
    stderr.execute(terminal::EnterAlternateScreen)?;
    stderr.execute(cevent::EnableMouseCapture)?;
    stderr.execute(ccursor::Hide)?;
    defer! {
        restore_terminal();
    }
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |pi| {
        restore_terminal();
        default_hook(pi);
    }));

    kb.enable();
    loop {
        render(&mut kb, &mut canvas, &typed.borrow(), &mut stderr)?;
        let e = cevent::read()?;
        match &e {
            cevent::Event::Key(k)
                if k.code == cevent::KeyCode::Esc
                    || (k.code == cevent::KeyCode::Char('c')
                        && k.modifiers.contains(cevent::KeyModifiers::CONTROL)) =>
            {
                break;
            }
            cevent::Event::Resize(w, h) => {
                let size = Expanse::new(u32::from(*w), u32::from(*h));
                canvas.resize(size);
                kb = build_keyboard(args, size, Rc::clone(&typed))?;
                let text = typed.borrow().clone();
                kb.set_text(&text);
                kb.enable();
                adapter.set_surface(size);
                info!(?size, "terminal resized");
            }
            _ => {
                if let Some(ie) = translate_event(&e) {
                    kb.update(&adapter.translate_all([&ie]));
                }
            }
        }
    }
    Ok(())
}

/// Run the demo.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log.as_deref())?;
    match &args.type_text {
        Some(text) => headless(&args, text),
        None => interactive(&args),
    }
}
