// Display pipeline scenarios
//
// These tests run the full path from bit-plane video memory to the RGB24
// frame handed to the surface, with and without the overlay.

mod common;

use common::RecordingCore;
use pro_term::display::screen::RenderOutcome;
use pro_term::display::{PALETTE, SCREEN_HEIGHT, SCREEN_WIDTH};
use pro_term::menu::NoMenu;
use pro_term::overlay::{Column, DrawMode, Font, Row, OPAQUE};
use pro_term::{HeadlessSurface, Terminal, VideoMemory};

#[test]
fn test_uniform_index_five_is_magenta() {
    let mut terminal = Terminal::new(HeadlessSurface::new(), NoMenu);
    let core = RecordingCore::filled(5);

    terminal.render(&core).unwrap();

    let surface = terminal.surface();
    assert_eq!(surface.dimensions(), (SCREEN_WIDTH, SCREEN_HEIGHT));
    assert_eq!(PALETTE[5], [255, 0, 255]);
    for pixel in surface.frame().chunks_exact(3) {
        assert_eq!(pixel, [255, 0, 255]);
    }
}

#[test]
fn test_every_palette_entry_round_trips() {
    let mut terminal = Terminal::new(HeadlessSurface::new(), NoMenu);
    let mut core = RecordingCore::new();
    for index in 0..8u8 {
        core.planes.set_pixel(index as usize * 16, 0, index);
    }

    terminal.render(&core).unwrap();

    for (index, color) in PALETTE.iter().enumerate() {
        assert_eq!(&terminal.surface().pixel(index * 16, 0), color);
    }
}

#[test]
fn test_word_bits_map_left_to_right() {
    let mut terminal = Terminal::new(HeadlessSurface::new(), NoMenu);
    let mut core = RecordingCore::new();
    // Bit 0 of plane 0 is the leftmost pixel of the word
    core.planes.set_word(0, 1, 0b1);

    terminal.render(&core).unwrap();

    assert_eq!(terminal.surface().pixel(16, 0), PALETTE[1]);
    assert_eq!(terminal.surface().pixel(17, 0), PALETTE[0]);
    assert_eq!(core.plane_words(1), [1, 0, 0]);
}

#[test]
fn test_static_screen_is_uploaded_once() {
    let mut terminal = Terminal::new(HeadlessSurface::new(), NoMenu);
    let core = RecordingCore::filled(2);

    for _ in 0..5 {
        terminal.render(&core).unwrap();
    }

    assert_eq!(terminal.screen().expansions(), 1);
    assert_eq!(terminal.surface().uploads(), 1);
    assert_eq!(terminal.surface().presents(), 5);
}

#[test]
fn test_overlay_text_blends_over_frame() {
    let mut terminal = Terminal::new(HeadlessSurface::new(), NoMenu);
    let mut core = RecordingCore::filled(4);

    let overlay = terminal.overlay_mut();
    overlay.enable();
    overlay.print_text(
        Column::Absolute(0),
        Row::Absolute(0),
        DrawMode::Replace,
        Font::Normal,
        "##",
    );
    let mut input = pro_term::input::ScriptedInput::new();
    terminal
        .tick(&mut input, &mut core, std::time::Instant::now())
        .unwrap();

    // Find a foreground pixel of the first cell and check it is opaque white
    let (x, y) = (0..10)
        .flat_map(|y| (0..12).map(move |x| (x, y)))
        .find(|&(x, y)| terminal.overlay().pixel(x, y) == Some((0xFF_FFFF, OPAQUE)))
        .expect("glyph has foreground pixels");
    assert_eq!(terminal.surface().pixel(x, y), [255, 255, 255]);

    // Outside the overlay the blue frame is untouched
    assert_eq!(terminal.surface().pixel(SCREEN_WIDTH - 1, SCREEN_HEIGHT - 1), [0, 0, 255]);

    // Background cells are darkened but still show the frame
    let [r, g, b] = terminal.surface().pixel(0, 0);
    assert_eq!((r, g), (0, 0));
    assert!(b > 0 && b < 255);

    // 24 pixels wide spans two video words on each of the ten rows
    assert_eq!(core.invalidated.len(), 20);
    assert!(core.invalidated.contains(&((9 << 6) | 1)));
}

#[test]
fn test_disabling_overlay_restores_frame() {
    let mut terminal = Terminal::new(HeadlessSurface::new(), NoMenu);
    let mut core = RecordingCore::filled(7);
    let mut input = pro_term::input::ScriptedInput::new();
    let start = std::time::Instant::now();

    terminal.overlay_mut().enable();
    terminal.overlay_mut().print_char(0, 0, DrawMode::Replace, Font::Bold, 'X');
    terminal.tick(&mut input, &mut core, start).unwrap();
    assert_ne!(terminal.surface().pixel(0, 0), [255, 255, 255]);

    terminal.overlay_mut().disable();
    let later = start + std::time::Duration::from_millis(20);
    terminal.tick(&mut input, &mut core, later).unwrap();

    assert_eq!(core.full_invalidations, 1);
    assert_eq!(terminal.surface().pixel(0, 0), [255, 255, 255]);
    assert_eq!(terminal.surface().uploads(), 2);
}

#[test]
fn test_video_mode_change_uses_new_height() {
    let mut terminal = Terminal::new(HeadlessSurface::new(), NoMenu);
    let core = RecordingCore::filled(1);

    terminal.render(&core).unwrap();
    terminal.video_mode_changed(256);
    let outcome = terminal.render(&core).unwrap();

    assert_eq!(outcome, RenderOutcome::Uploaded);
    assert_eq!(terminal.surface().dimensions(), (SCREEN_WIDTH, 256));
    assert_eq!(terminal.surface().pixel(0, 255), [255, 0, 0]);
}

#[test]
fn test_clear_blanks_surface() {
    let mut terminal = Terminal::new(HeadlessSurface::new(), NoMenu);
    let core = RecordingCore::filled(3);

    terminal.render(&core).unwrap();
    terminal.clear().unwrap();
    assert!(terminal.surface().frame().iter().all(|&b| b == 0));

    // The next frame is drawn again even though memory did not change
    assert_eq!(terminal.render(&core).unwrap(), RenderOutcome::Uploaded);
}

#[test]
fn test_closed_terminal_renders_nothing() {
    let mut terminal = Terminal::new(HeadlessSurface::new(), NoMenu);
    terminal.close();
    let outcome = terminal.render(&RecordingCore::new()).unwrap();
    assert_eq!(outcome, RenderOutcome::Closed);
    assert_eq!(terminal.surface().uploads(), 0);
}
