// Basic menu - A minimal overlay menu host
//
// Wakes on Ctrl followed by Print, draws a boxed page into the overlay and
// swallows keys until Exit or Resume closes it again.

use super::{menu_origin, MenuHost, MENU_HEIGHT, MENU_WIDTH};
use crate::input::VirtualKey;
use crate::overlay::{Column, DrawMode, Font, Overlay, Row};
use tracing::info;

const TITLE: &str = "Terminal Menu";
const ITEMS: [&str; 3] = ["Resume", "Reset keyboard", "Help"];
const FOOTER: &str = "Up/Down select, Return confirms";

/// Overlay menu opened by the Ctrl+Print wake sequence
#[derive(Debug, Default)]
pub struct BasicMenu {
    active: bool,
    ctrl_seen: bool,
    selected: usize,
    fullscreen: bool,
    opened: u64,
    keyboard_reset: bool,
}

impl BasicMenu {
    pub fn new(fullscreen: bool) -> Self {
        Self {
            fullscreen,
            ..Self::default()
        }
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// How many times the menu has been opened
    pub fn opened(&self) -> u64 {
        self.opened
    }

    fn open(&mut self, overlay: &mut Overlay) {
        self.active = true;
        self.ctrl_seen = false;
        self.selected = 0;
        self.opened += 1;
        overlay.enable();
        self.draw(overlay);
        info!("menu opened");
    }

    fn close(&mut self, overlay: &mut Overlay) -> Option<VirtualKey> {
        self.active = false;
        overlay.disable();
        info!("menu closed");
        // Modifiers may have been released while the menu swallowed keys
        Some(VirtualKey::ALL_UPS)
    }

    fn draw(&self, overlay: &mut Overlay) {
        let (x, y) = menu_origin(self.fullscreen);
        let inner = MENU_WIDTH - 2;
        let edge = format!("+{}+", "-".repeat(inner));
        let blank = format!("|{}|", " ".repeat(inner));

        overlay.clear();
        overlay.print_text(Column::Absolute(x), Row::Absolute(y), DrawMode::Replace, Font::Normal, &edge);
        for _ in 1..MENU_HEIGHT - 1 {
            overlay.print_text(Column::Absolute(x), Row::NextRow, DrawMode::Replace, Font::Normal, &blank);
        }
        overlay.print_text(Column::Absolute(x), Row::NextRow, DrawMode::Replace, Font::Normal, &edge);

        overlay.print_text(
            Column::Absolute(x + (MENU_WIDTH - TITLE.len()) / 2),
            Row::Absolute(y + 1),
            DrawMode::Replace,
            Font::Bold,
            TITLE,
        );
        for (i, item) in ITEMS.iter().enumerate() {
            let mode = if i == self.selected {
                DrawMode::Invert
            } else {
                DrawMode::Replace
            };
            overlay.print_text(
                Column::Absolute(x + 3),
                Row::Absolute(y + 4 + i * 2),
                mode,
                Font::Normal,
                item,
            );
        }
        overlay.print_text(
            Column::Absolute(x + 3),
            Row::Absolute(y + MENU_HEIGHT - 2),
            DrawMode::Replace,
            Font::Normal,
            FOOTER,
        );
    }

    fn confirm(&mut self, overlay: &mut Overlay) -> Option<VirtualKey> {
        match self.selected {
            0 => self.close(overlay),
            1 => {
                info!("keyboard reset requested");
                self.keyboard_reset = true;
                self.close(overlay)
            }
            _ => {
                overlay.print_text(
                    Column::Absolute(menu_origin(self.fullscreen).0 + 3),
                    Row::Absolute(menu_origin(self.fullscreen).1 + MENU_HEIGHT - 4),
                    DrawMode::Replace,
                    Font::Normal,
                    "Ctrl+F1 opens this menu",
                );
                None
            }
        }
    }
}

impl MenuHost for BasicMenu {
    fn is_active(&self) -> bool {
        self.active
    }

    fn reset(&mut self) {
        self.active = false;
        self.ctrl_seen = false;
        self.selected = 0;
    }

    fn take_keyboard_reset(&mut self) -> bool {
        std::mem::take(&mut self.keyboard_reset)
    }

    fn filter(&mut self, key: VirtualKey, overlay: &mut Overlay) -> Option<VirtualKey> {
        if !self.active {
            if key == VirtualKey::PRINT && self.ctrl_seen {
                self.open(overlay);
                return None;
            }
            self.ctrl_seen = key == VirtualKey::CTRL
                || (self.ctrl_seen && key != VirtualKey::ALL_UPS);
            return Some(key);
        }

        match key {
            VirtualKey::EXIT | VirtualKey::RESUME => self.close(overlay),
            VirtualKey::UP => {
                self.selected = (self.selected + ITEMS.len() - 1) % ITEMS.len();
                self.draw(overlay);
                None
            }
            VirtualKey::DOWN => {
                self.selected = (self.selected + 1) % ITEMS.len();
                self.draw(overlay);
                None
            }
            VirtualKey::RETURN => self.confirm(overlay),
            _ => None,
        }
    }
}
