//! A minimal graphical front end for the HP-35 core.
//!
//! This intentionally stops at wiring a handful of keys and a text readout
//! of the projected display: the physical key-matrix scan and seven-segment
//! rendering are host-board concerns the core does not take a position on.

// Hide console window on Windows.
#![windows_subsystem = "windows"]

use hp35_core::cpu::rom::Rom;
use hp35_core::keys::code;
use hp35_core::System;
use iced::widget::{button, column, row, text};
use iced::{Element, Sandbox, Settings};

/// How many CPU microcycles to run per UI tick. The real chip runs far
/// faster than a human can press keys; settling a keystroke's visible effect
/// takes a few hundred cycles of the emulated ROM.
const CYCLES_PER_STEP: u32 = 2000;

fn main() -> iced::Result {
    env_logger::init();
    Hp35::run(Settings::default())
}

struct Hp35 {
    system: System,
    display: String,
}

#[derive(Debug, Clone, Copy)]
enum Message {
    KeyPressed(u8),
    Step,
}

impl Sandbox for Hp35 {
    type Message = Message;

    fn new() -> Self {
        Self {
            system: System::new(Rom::new()),
            display: String::new(),
        }
    }

    fn title(&self) -> String {
        "hp35".to_owned()
    }

    fn update(&mut self, message: Message) {
        match message {
            Message::KeyPressed(code) => self.system.press_key(code),
            Message::Step => {}
        }

        for _ in 0..CYCLES_PER_STEP {
            if let (Some(frame), _) = self.system.tick() {
                self.display = frame
                    .cells
                    .iter()
                    .map(|cell| format!("{:02X}", cell & !hp35_core::display::DECIMAL_POINT))
                    .collect::<Vec<_>>()
                    .join(" ");
            }
        }
    }

    fn view(&self) -> Element<Message> {
        column![
            text(&self.display).size(32),
            row![
                button("1").on_press(Message::KeyPressed(code::ONE)),
                button("2").on_press(Message::KeyPressed(code::TWO)),
                button("3").on_press(Message::KeyPressed(code::THREE)),
                button("+").on_press(Message::KeyPressed(code::ADD)),
            ]
            .spacing(4),
            button("Step").on_press(Message::Step),
        ]
        .spacing(8)
        .padding(16)
        .into()
    }
}
