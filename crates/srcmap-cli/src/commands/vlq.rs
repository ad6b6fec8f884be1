//! Vlq command - encode integers to Base64 VLQ text and back.

use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct VlqCommand {
    #[command(subcommand)]
    pub action: VlqAction,
}

#[derive(Subcommand)]
pub enum VlqAction {
    /// Print the VLQ text for a list of integers
    Encode {
        /// Values to encode, in order
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<i64>,
    },
    /// Print the integers held in VLQ text
    Decode {
        /// VLQ text, e.g. `AAgBC`
        text: String,
    },
}

impl VlqCommand {
    pub fn run(&self) -> Result<()> {
        println!("{}", self.render()?);
        Ok(())
    }

    fn render(&self) -> Result<String> {
        Ok(match &self.action {
            VlqAction::Encode { values } => srcmap::vlq::encode(values),
            VlqAction::Decode { text } => srcmap::vlq::decode(text)?
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(" "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_render() {
        let cmd = VlqCommand {
            action: VlqAction::Encode {
                values: vec![0, -16, 228],
            },
        };
        assert_eq!(cmd.render().unwrap(), "AhBoO");
    }

    #[test]
    fn test_decode_render() {
        let cmd = VlqCommand {
            action: VlqAction::Decode {
                text: "AhBoO".to_string(),
            },
        };
        assert_eq!(cmd.render().unwrap(), "0 -16 228");
    }

    #[test]
    fn test_decode_render_reports_bad_text() {
        let cmd = VlqCommand {
            action: VlqAction::Decode {
                text: "g".to_string(),
            },
        };
        assert!(cmd.render().is_err());
    }
}
