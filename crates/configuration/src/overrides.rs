//! Command-line overrides layered on top of file and environment settings.

use crate::settings::Settings;
use clap::Args;
use std::path::PathBuf;

/// Flags shared by every subcommand. Unset flags leave the loaded value alone.
#[derive(Args, Debug, Clone, Default)]
pub struct CliOverrides {
    /// Path to the consolidated trade CSV.
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Directory the reports are written to.
    #[arg(long, global = true)]
    pub output: Option<PathBuf>,

    /// ISO3 code of the importing country under study.
    #[arg(long, global = true)]
    pub subject: Option<String>,

    /// ISO3 code of the primary partner.
    #[arg(long, global = true)]
    pub partner: Option<String>,

    /// Abort on the first malformed row.
    #[arg(long, global = true)]
    pub strict: bool,
}

impl Settings {
    /// Applies the command-line overrides. Call `validate` afterwards.
    pub fn apply_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(data) = &overrides.data {
            self.analysis.data_path = data.clone();
        }
        if let Some(output) = &overrides.output {
            self.analysis.output_dir = output.clone();
        }
        if let Some(subject) = &overrides.subject {
            self.analysis.subject = subject.clone();
        }
        if let Some(partner) = &overrides.partner {
            self.analysis.primary_partner = partner.clone();
        }
        if overrides.strict {
            self.analysis.strict_load = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_set_flags_override() {
        let mut settings = Settings::default();
        let overrides = CliOverrides {
            subject: Some("VNM".to_string()),
            strict: true,
            ..Default::default()
        };
        settings.apply_overrides(&overrides);

        assert_eq!(settings.analysis.subject, "VNM");
        assert_eq!(settings.analysis.primary_partner, "CHN");
        assert!(settings.analysis.strict_load);
        assert_eq!(
            settings.analysis.data_path,
            PathBuf::from("data/merged/consolidated_trade_data.csv")
        );
    }
}
