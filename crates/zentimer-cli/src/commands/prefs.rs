use clap::{Subcommand, ValueEnum};

use super::{CommandResult, Session};

#[derive(Clone, Copy, ValueEnum)]
pub enum Effect {
    Haptic,
    Flash,
    Sound,
    Quiet,
}

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Print alert preferences as JSON
    Show,
    /// Flip one alert preference
    Toggle {
        #[arg(value_enum)]
        effect: Effect,
    },
}

pub fn run(action: PrefsAction) -> CommandResult {
    let mut session = Session::launch()?;
    match action {
        PrefsAction::Show => {
            println!(
                "{}",
                serde_json::to_string_pretty(session.controller.preferences())?
            );
            session.close();
            Ok(())
        }
        PrefsAction::Toggle { effect } => {
            let controller = &mut session.controller;
            let event = match effect {
                Effect::Haptic => controller.toggle_haptic(),
                Effect::Flash => controller.toggle_flash(),
                Effect::Sound => controller.toggle_sound(),
                Effect::Quiet => controller.toggle_quiet_mode(),
            };
            session.finish(event)
        }
    }
}
