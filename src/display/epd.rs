//! Waveshare 2.13" panel presenter (Raspberry Pi SPI wiring).
//!
//! Boundary glue only: text placement is deliberately simple. The interesting
//! part is the refresh-mode mapping — [`RefreshKind::Partial`] uses the
//! panel's quick LUT, [`RefreshKind::Full`] and the no-data placeholder use
//! the full LUT.

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_6X10, FONT_10X20},
        MonoTextStyle,
    },
    prelude::*,
    text::Text,
};
use epd_waveshare::{
    epd2in13_v2::{Display2in13, EPD2in13},
    prelude::*,
};
use linux_embedded_hal::{
    spidev::{SpiModeFlags, SpidevOptions},
    sysfs_gpio::Direction,
    Delay, Spidev, SysfsPin,
};
use tracing::debug;

use super::{BoardView, DisplayError, Presenter, RefreshKind};

// Standard Waveshare e-Paper HAT wiring (BCM numbering).
const PIN_CS: u64 = 8;
const PIN_BUSY: u64 = 24;
const PIN_DC: u64 = 25;
const PIN_RST: u64 = 17;

pub struct EpdPresenter {
    spi: Spidev,
    epd: EPD2in13<Spidev, SysfsPin, SysfsPin, SysfsPin, SysfsPin>,
}

fn startup<E: std::fmt::Debug>(err: E) -> DisplayError {
    DisplayError::NoPanel(format!("{err:?}"))
}

fn draw_failure<E: std::fmt::Debug>(err: E) -> DisplayError {
    DisplayError::Draw(format!("{err:?}"))
}

fn gpio(pin: u64, direction: Direction) -> Result<SysfsPin, DisplayError> {
    let pin = SysfsPin::new(pin);
    pin.export().map_err(startup)?;
    pin.set_direction(direction).map_err(startup)?;
    Ok(pin)
}

fn lut_for(refresh: RefreshKind) -> RefreshLUT {
    match refresh {
        RefreshKind::Full => RefreshLUT::FULL,
        RefreshKind::Partial => RefreshLUT::QUICK,
    }
}

impl EpdPresenter {
    /// Bring up the panel. Failure here is not fatal to the process; the
    /// caller degrades to console output instead.
    pub fn new() -> Result<Self, DisplayError> {
        let mut spi = Spidev::open("/dev/spidev0.0").map_err(startup)?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(4_000_000)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options).map_err(startup)?;

        let cs = gpio(PIN_CS, Direction::Out)?;
        let busy = gpio(PIN_BUSY, Direction::In)?;
        let dc = gpio(PIN_DC, Direction::Out)?;
        let rst = gpio(PIN_RST, Direction::Out)?;

        let mut delay = Delay {};
        let epd = EPD2in13::new(&mut spi, cs, busy, dc, rst, &mut delay).map_err(startup)?;

        debug!(width = epd.width(), height = epd.height(), "Panel initialized");

        Ok(Self { spi, epd })
    }

    fn blank_frame(&self) -> Display2in13 {
        let mut display = Display2in13::default();
        display.set_rotation(DisplayRotation::Rotate90);
        let _ = display.clear(Color::White);
        display
    }

    fn push(&mut self, display: &Display2in13, refresh: RefreshKind) -> Result<(), DisplayError> {
        self.epd
            .set_lut(&mut self.spi, Some(lut_for(refresh)))
            .map_err(draw_failure)?;
        self.epd
            .update_and_display_frame(&mut self.spi, display.buffer())
            .map_err(draw_failure)
    }
}

impl Presenter for EpdPresenter {
    fn show_board(&mut self, view: &BoardView, refresh: RefreshKind) -> Result<(), DisplayError> {
        let mut display = self.blank_frame();

        let small = MonoTextStyle::new(&FONT_6X10, Color::Black);
        let large = MonoTextStyle::new(&FONT_10X20, Color::Black);

        Text::new(&view.route, Point::new(2, 10), small)
            .draw(&mut display)
            .map_err(draw_failure)?;

        for (index, slot) in view.times.iter().enumerate() {
            let y = 40 + (index as i32) * 24;
            Text::new(slot, Point::new(10, y), large)
                .draw(&mut display)
                .map_err(draw_failure)?;
        }

        let fetched = format!("Fetched: {}", view.fetched_at);
        Text::new(&fetched, Point::new(2, 118), small)
            .draw(&mut display)
            .map_err(draw_failure)?;

        self.push(&display, refresh)
    }

    fn show_no_data(&mut self, wall_clock: &str) -> Result<(), DisplayError> {
        let mut display = self.blank_frame();

        let style = MonoTextStyle::new(&FONT_10X20, Color::Black);
        Text::new("No data available", Point::new(2, 30), style)
            .draw(&mut display)
            .map_err(draw_failure)?;
        Text::new(wall_clock, Point::new(2, 60), style)
            .draw(&mut display)
            .map_err(draw_failure)?;

        self.push(&display, RefreshKind::Full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_refresh_selects_the_quick_lut() {
        assert!(matches!(lut_for(RefreshKind::Partial), RefreshLUT::QUICK));
        assert!(matches!(lut_for(RefreshKind::Full), RefreshLUT::FULL));
    }
}
