//! Server console presets issued when a match starts.

use garrison_host::api::Console;
use tracing::info;

use crate::config::MatchConfig;

/// Keeps the server in an endless offline warmup with bots frozen.
pub const WARMUP_PRESET: &[&str] = &[
    "mp_warmup_offline_enabled 1",
    "mp_warmup_pausetimer 1",
    "bot_stop 1",
    "mp_buy_anywhere 1",
];

/// Movement settings for climbing maps: free bunny hopping, no stamina loss.
pub const KZ_MOVEMENT_PRESET: &[&str] = &[
    "sv_airaccelerate 100.000000",
    "sv_enablebunnyhopping true",
    "sv_autobunnyhopping false",
    "sv_falldamage_scale 0.000000",
    "sv_staminajumpcost 0.000000",
    "sv_staminalandcost 0.000000",
    "sv_timebetweenducks 0.000000",
    "sv_staminarecoveryrate 60.000000",
    "sv_staminamax 0.000000",
    "sv_ladder_scale_speed 1.000000",
    "sv_jump_impulse 301.993378",
    "sv_friction 5.000000",
    "sv_accelerate_use_weapon_speed false",
    "sv_accelerate 6.500000",
    "sv_maxvelocity 2000.000000",
    "sv_air_max_wishspeed 30.000000",
    "sv_gravity 800.000000",
    "sv_standable_normal 0.700000",
    "sv_wateraccelerate 10.000000",
    "sv_disable_radar 1",
];

/// Issue the configured warmup commands, then the movement preset if
/// enabled. Returns how many commands were sent.
pub fn apply_presets<C: Console + ?Sized>(console: &mut C, config: &MatchConfig) -> usize {
    for command in &config.warmup_commands {
        console.server_command(command);
    }
    let mut issued = config.warmup_commands.len();
    if config.kz_movement {
        for command in KZ_MOVEMENT_PRESET {
            console.server_command(command);
        }
        issued += KZ_MOVEMENT_PRESET.len();
    }
    info!(issued, kz_movement = config.kz_movement, "server presets applied");
    issued
}

#[cfg(test)]
mod tests {
    use super::*;
    use garrison_host::sim::SimHost;

    #[test]
    fn warmup_only_by_default() {
        let mut host = SimHost::new();
        let issued = apply_presets(&mut host, &MatchConfig::default());
        assert_eq!(issued, 4);
        assert_eq!(host.server_commands(), WARMUP_PRESET);
    }

    #[test]
    fn movement_preset_follows_warmup() {
        let mut host = SimHost::new();
        let config = MatchConfig {
            kz_movement: true,
            ..MatchConfig::default()
        };
        apply_presets(&mut host, &config);
        let commands = host.server_commands();
        assert_eq!(commands.len(), WARMUP_PRESET.len() + KZ_MOVEMENT_PRESET.len());
        assert_eq!(commands[4], "sv_airaccelerate 100.000000");
        assert_eq!(commands.last().map(String::as_str), Some("sv_disable_radar 1"));
    }
}
