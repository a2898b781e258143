//! Audio cue dispatch
//!
//! The simulation only raises `GameEvent`s. This module turns them into
//! named sound effects and music changes and hands those to an `AudioSink`,
//! which is whatever the host uses for actual playback.

use crate::ms_to_ticks;
use crate::settings::Settings;
use crate::sim::{GameEvent, PowerUpKind};

/// Background music fade when the player dies
const MUSIC_FADE_MS: f32 = 5000.0;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Enemy destroyed
    EnemyExplosion,
    /// Dual shot picked up
    PowerUpDualShot,
    /// Health pack picked up
    PowerUpHealthPack,
    /// Player ship destroyed
    PlayerDeath,
}

impl SoundEffect {
    pub fn asset_path(&self) -> &'static str {
        match self {
            SoundEffect::EnemyExplosion => "assets/sounds/entity_explosion.wav",
            SoundEffect::PowerUpDualShot => "assets/sounds/powerup_dualshot.wav",
            SoundEffect::PowerUpHealthPack => "assets/sounds/powerup_healthpack.wav",
            SoundEffect::PlayerDeath => "assets/sounds/player_death_sfx.wav",
        }
    }

    /// Pickup jingle, if the kind has one
    pub fn for_powerup(kind: PowerUpKind) -> Option<Self> {
        match kind {
            PowerUpKind::DualShot => Some(SoundEffect::PowerUpDualShot),
            PowerUpKind::HealthPack => Some(SoundEffect::PowerUpHealthPack),
            PowerUpKind::FireRateBoost | PowerUpKind::TripleShot | PowerUpKind::TripleBurst => {
                None
            }
        }
    }
}

/// Looping music tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicTrack {
    Gameplay,
    GameOver,
}

impl MusicTrack {
    pub fn asset_path(&self) -> &'static str {
        match self {
            MusicTrack::Gameplay => "assets/sounds/gameplay_music3.mp3",
            MusicTrack::GameOver => "assets/sounds/gameover_themesong.mp3",
        }
    }
}

/// Playback backend
pub trait AudioSink {
    fn play_effect(&mut self, effect: SoundEffect, gain: f32);
    fn play_music(&mut self, track: MusicTrack, gain: f32);
    /// Fade the current track to silence over `ticks`, then stop it
    fn fade_out_music(&mut self, ticks: u32);
}

/// Sink that only logs, for headless runs
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play_effect(&mut self, effect: SoundEffect, gain: f32) {
        log::debug!("sfx {} @ {:.2}", effect.asset_path(), gain);
    }

    fn play_music(&mut self, track: MusicTrack, gain: f32) {
        log::debug!("music {} @ {:.2}", track.asset_path(), gain);
    }

    fn fade_out_music(&mut self, ticks: u32) {
        log::debug!("music fade over {} ticks", ticks);
    }
}

/// Audio manager for the game
pub struct AudioManager<S: AudioSink> {
    sink: S,
    settings: Settings,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S, settings: &Settings) -> Self {
        Self {
            sink,
            settings: settings.clone(),
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.settings.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.settings.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_music_volume(&mut self, vol: f32) {
        self.settings.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
    }

    fn effect(&mut self, effect: SoundEffect) {
        let gain = self.settings.sfx_gain();
        if gain > 0.0 {
            self.sink.play_effect(effect, gain);
        }
    }

    fn music(&mut self, track: MusicTrack) {
        let gain = self.settings.music_gain();
        if gain > 0.0 {
            self.sink.play_music(track, gain);
        }
    }

    /// React to one simulation event
    pub fn handle(&mut self, event: &GameEvent) {
        match event {
            GameEvent::BackgroundMusicStart => self.music(MusicTrack::Gameplay),
            GameEvent::BackgroundMusicStop => self.sink.fade_out_music(ms_to_ticks(MUSIC_FADE_MS)),
            GameEvent::EnemyDestroyed { .. } => self.effect(SoundEffect::EnemyExplosion),
            GameEvent::PowerUpCollected { kind } => {
                if let Some(effect) = SoundEffect::for_powerup(*kind) {
                    self.effect(effect);
                }
            }
            GameEvent::PlayerDeath => self.effect(SoundEffect::PlayerDeath),
            GameEvent::GameOver { .. } => self.music(MusicTrack::GameOver),
            GameEvent::GameStarted
            | GameEvent::WaveStarted { .. }
            | GameEvent::WaveCleared { .. }
            | GameEvent::PlayerHit { .. }
            | GameEvent::PowerUpExpired { .. } => {}
        }
    }

    pub fn handle_all<'a>(&mut self, events: impl IntoIterator<Item = &'a GameEvent>) {
        for event in events {
            self.handle(event);
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
