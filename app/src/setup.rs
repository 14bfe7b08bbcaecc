//! First-run setup: credentials file, streamer list, then `config.json`.
//!
//! Each run advances as far as it can. When the operator has to edit a
//! file before continuing, the wizard creates it and asks for a restart.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::defaults::{
    CONFIG_FILE, DEFAULT_IDLE_THRESHOLD_SECS, DEFAULT_STREAMER_LIST, SETUP_STATE_FILE,
};
use crate::config::{
    ConfigError, CredentialsError, FarmerConfig, credentials, minimum_check_interval,
};
use crate::streamers::{read_streamers, write_default_streamers};

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("terminal I/O failed: {0}")]
    Terminal(#[source] std::io::Error),

    #[error("failed to access {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("setup state in {} is unreadable: {source}", .path.display())]
    State {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Credentials(#[from] CredentialsError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupOutcome {
    /// Everything the loop needs is in place.
    Ready,
    /// A file was created for the operator to edit; run again afterwards.
    Restart(String),
}

/// Carries the chosen list name from the list step to the config step,
/// which usually happens in a later run.
#[derive(Debug, Serialize, Deserialize)]
struct SetupState {
    streamers_file: String,
}

pub struct Wizard<R, W> {
    data_dir: PathBuf,
    skip_intro: bool,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Wizard<R, W> {
    pub fn new(data_dir: impl Into<PathBuf>, skip_intro: bool, input: R, output: W) -> Self {
        Self {
            data_dir: data_dir.into(),
            skip_intro,
            input,
            output,
        }
    }

    pub fn run(&mut self) -> Result<SetupOutcome, SetupError> {
        let config_path = self.data_dir.join(CONFIG_FILE);
        let configured = if config_path.exists() {
            Some(FarmerConfig::load(&config_path)?)
        } else {
            None
        };

        if let Some(outcome) = self.credentials_step()? {
            return Ok(outcome);
        }
        if let Some(outcome) = self.streamer_list_step(configured.as_ref())? {
            return Ok(outcome);
        }
        if configured.is_none() {
            self.config_step(&config_path)?;
        }
        Ok(SetupOutcome::Ready)
    }

    fn credentials_step(&mut self) -> Result<Option<SetupOutcome>, SetupError> {
        let env_path = credentials::env_path(&self.data_dir);
        if !env_path.exists() {
            self.explain(&[
                "Hi! Welcome to the Twitch Channel Point Farmer 2.0!",
                "Let's set up the basics.",
                "",
            ])?;
            self.say(
                "First you will have to get the Twitch API credentials and place them in the \
                 .env file that will be created shortly. Once that is done you can restart \
                 the program to proceed with the setup!",
            )?;
            credentials::write_template(&env_path)?;
            return Ok(Some(SetupOutcome::Restart(format!(
                "fill in the Twitch API credentials in {}",
                env_path.display()
            ))));
        }

        match credentials::load(&self.data_dir) {
            Ok(_) => Ok(None),
            Err(CredentialsError::Empty) => {
                self.say(
                    "Seems like you forgot to enter the Twitch API credentials into the .env \
                     file. Once you've done that, you can proceed with the setup.",
                )?;
                Ok(Some(SetupOutcome::Restart(
                    "client_id or client_secret is empty".to_string(),
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn streamer_list_step(
        &mut self,
        configured: Option<&FarmerConfig>,
    ) -> Result<Option<SetupOutcome>, SetupError> {
        if let Some(config) = configured {
            let path = config.streamer_list_path(&self.data_dir);
            if path.exists() {
                return Ok(None);
            }
            self.write_list(&path)?;
            self.say(&format!(
                "Open {} to add your favorite streamers!",
                config.active_list
            ))?;
            return Ok(Some(SetupOutcome::Restart(format!(
                "add streamers to {}",
                path.display()
            ))));
        }

        let name = self.pending_list_name()?;
        if self.data_dir.join(&name).exists() {
            return Ok(None);
        }

        self.explain(&[
            "Now that the Twitch API credentials are in place, let's create the streamer list.",
            "You can add as many streamers to this list as you want, but keep in mind that \
             the more streamers you add, the longer the check interval has to be.",
            "First, we need to name the list. By default, the name is 'streamers.txt', but \
             you can name it whatever you want!",
            "",
        ])?;
        let name = self.ask(
            "What would you like to name the list? (streamers.txt)",
            DEFAULT_STREAMER_LIST,
        )?;
        let path = self.data_dir.join(&name);
        self.write_list(&path)?;
        self.save_state(&SetupState {
            streamers_file: name.clone(),
        })?;

        self.say("")?;
        self.say(&format!(
            "Great! Now all you have to do is open {name} to add your favorite streamers! \
             Restart the program when you're ready to proceed with the setup!"
        ))?;
        Ok(Some(SetupOutcome::Restart(format!(
            "add streamers to {}",
            path.display()
        ))))
    }

    fn config_step(&mut self, config_path: &Path) -> Result<(), SetupError> {
        let list_name = self.pending_list_name()?;
        let count = read_streamers(&self.data_dir.join(&list_name)).len();
        let minimum = minimum_check_interval(count);

        self.explain(&[
            "This is the last step. Now we just have to set up the basic config.",
            "You can change these settings at any time in the 'config.json' file.",
            "",
            "First off, the check interval. This is the interval between each check in with \
             Twitch to check if the streamers are live.",
            "The absolute minimum for this interval is 15 seconds, but there is also a \
             dynamic limit. For every streamer added in the list, 5 seconds are added to \
             the dynamic limit.",
        ])?;
        self.say(&format!(
            "Based on the current list ({list_name}), the minimum is {minimum}."
        ))?;
        let check_interval_seconds = self.ask_number(
            &format!("What would you like the check interval to be? ({minimum})"),
            minimum,
            minimum,
        )?;

        self.explain(&[
            "",
            "Alright. Next up is the max idle duration. This is the amount of time in \
             seconds of inactivity before the computer is considered 'idle'.",
        ])?;
        let idle_threshold_seconds = self.ask_number(
            &format!("What would you like the max idle duration to be? ({DEFAULT_IDLE_THRESHOLD_SECS})"),
            DEFAULT_IDLE_THRESHOLD_SECS,
            0,
        )?;

        self.say("")?;
        let notifications_enabled = self.ask_yes_no(
            "Do you want to enable notifications when the streamers go live while the \
             computer is not idle? (y/n)",
        )?;

        self.explain(&[
            "",
            "Next up, autofarming. This allows the program to open up Chrome and 'watch' \
             the streams when the streamers are live and the computer is 'idle'.",
            "Without this, the program will not be farming any channel points.",
        ])?;
        let auto_attend_enabled = self.ask_yes_no("Do you wish to enable autofarming? (y/n)")?;

        let config = FarmerConfig {
            check_interval_seconds,
            idle_threshold_seconds,
            notifications_enabled,
            auto_attend_enabled,
            active_list: list_name,
            ..FarmerConfig::default()
        };
        config.save(config_path)?;

        let state_path = self.data_dir.join(SETUP_STATE_FILE);
        if let Err(e) = std::fs::remove_file(&state_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %state_path.display(), "Failed to remove setup state: {e}");
            }
        }

        self.say("")?;
        self.say("That's it! The program is now ready!")?;
        tracing::info!("First time setup complete!");
        Ok(())
    }

    /// List name chosen in an earlier run, or the default.
    fn pending_list_name(&self) -> Result<String, SetupError> {
        let path = self.data_dir.join(SETUP_STATE_FILE);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(DEFAULT_STREAMER_LIST.to_string());
            }
            Err(source) => return Err(SetupError::File { path, source }),
        };
        let state: SetupState =
            serde_json::from_str(&raw).map_err(|source| SetupError::State { path, source })?;
        Ok(state.streamers_file)
    }

    fn save_state(&self, state: &SetupState) -> Result<(), SetupError> {
        let path = self.data_dir.join(SETUP_STATE_FILE);
        let body = serde_json::to_string_pretty(state).map_err(|source| SetupError::State {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, body).map_err(|source| SetupError::File { path, source })
    }

    fn write_list(&self, path: &Path) -> Result<(), SetupError> {
        write_default_streamers(path).map_err(|source| SetupError::File {
            path: path.to_path_buf(),
            source,
        })
    }

    fn say(&mut self, line: &str) -> Result<(), SetupError> {
        writeln!(self.output, "{line}").map_err(SetupError::Terminal)
    }

    /// Explanatory text, left out with `--skip-intro`.
    fn explain(&mut self, lines: &[&str]) -> Result<(), SetupError> {
        if self.skip_intro {
            return Ok(());
        }
        for line in lines {
            self.say(line)?;
        }
        Ok(())
    }

    /// Ask a question; an empty answer (or end of input) picks `default`.
    fn ask(&mut self, question: &str, default: &str) -> Result<String, SetupError> {
        self.say(question)?;
        self.output.flush().map_err(SetupError::Terminal)?;

        let mut answer = String::new();
        self.input
            .read_line(&mut answer)
            .map_err(SetupError::Terminal)?;
        let answer = answer.trim();
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer.to_string()
        })
    }

    /// Ask for a whole number of at least `minimum`, repeating until one
    /// is given.
    fn ask_number(&mut self, question: &str, default: u64, minimum: u64) -> Result<u64, SetupError> {
        loop {
            let answer = self.ask(question, &default.to_string())?;
            match answer.parse::<u64>() {
                Ok(value) if value >= minimum => return Ok(value),
                Ok(_) => self.say(&format!("The value has to be at least {minimum}."))?,
                Err(_) => self.say("Please enter a whole number of seconds.")?,
            }
        }
    }

    /// Anything other than a clear "no" counts as yes.
    fn ask_yes_no(&mut self, question: &str) -> Result<bool, SetupError> {
        let answer = self.ask(question, "y")?.to_lowercase();
        match answer.as_str() {
            "y" | "yes" => Ok(true),
            "n" | "no" => Ok(false),
            _ => {
                self.say("Invalid syntax. Defaulting to yes.")?;
                Ok(true)
            }
        }
    }
}
