//! Console fallback used when no e-ink panel is attached: each drawn tick
//! prints the same three values as plain text. Refresh modes are meaningless
//! here and ignored.

use super::{BoardView, DisplayError, Presenter, RefreshKind};
use crate::board::PLACEHOLDER;

#[derive(Debug, Default)]
pub struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn show_board(&mut self, view: &BoardView, _refresh: RefreshKind) -> Result<(), DisplayError> {
        println!();
        println!("{} (fetched: {})", view.route, view.fetched_at);
        for slot in &view.times {
            if slot == PLACEHOLDER {
                println!("No further bus due");
            } else {
                println!("Bus due in {slot} minutes");
            }
        }
        Ok(())
    }

    fn show_no_data(&mut self, wall_clock: &str) -> Result<(), DisplayError> {
        println!();
        println!("No data available");
        println!("{wall_clock}");
        Ok(())
    }
}
