//! Control-change numbers for named controllers and effects

use once_cell::sync::Lazy;

use super::SymbolTable;

const CONTROLLERS: &[(&str, u8)] = &[
    // Bank
    ("bank_select", 0),
    // Modulation and expression
    ("modulation", 1),
    ("breath", 2),
    ("foot_control", 4),
    ("portamento_time", 5),
    ("data_entry", 6),
    ("volume", 7),
    ("balance", 8),
    ("pan", 10),
    ("expression", 11),
    ("effect1", 12),
    ("effect2", 13),
    // General purpose
    ("general_1", 16),
    ("general_2", 17),
    ("general_3", 18),
    ("general_4", 19),
    // Pedals and toggles
    ("sustain", 64),
    ("portamento_toggle", 65),
    ("sostenuto", 66),
    ("soft_pedal", 67),
    ("legato", 68),
    ("hold_2", 69),
    // Sound controllers
    ("sound_ctrl_1", 70),
    ("resonance", 71),
    ("release_time", 72),
    ("attack_time", 73),
    ("brightness", 74),
    ("sound_ctrl_6", 75),
    ("sound_ctrl_7", 76),
    ("sound_ctrl_8", 77),
    ("sound_ctrl_9", 78),
    ("sound_ctrl_10", 79),
    // Effect depths
    ("reverb", 91),
    ("tremolo", 92),
    ("chorus", 93),
    ("detune", 94),
    ("phaser", 95),
    // Parameter numbers
    ("data_increment", 96),
    ("data_decrement", 97),
    ("nrpn_lsb", 98),
    ("nrpn_msb", 99),
    ("rpn_lsb", 100),
    ("rpn_msb", 101),
    // Channel mode
    ("all_sound_off", 120),
    ("reset_controllers", 121),
    ("local_control", 122),
    ("all_notes_off", 123),
    ("omni_off", 124),
    ("omni_on", 125),
    ("mono_on", 126),
    ("poly_on", 127),
];

const ALIASES: &[(&str, &str)] = &[
    ("mod_wheel", "modulation"),
    ("modulation_wheel", "modulation"),
    ("breath_controller", "breath"),
    ("portamento", "portamento_time"),
    ("main_volume", "volume"),
    ("channel_volume", "volume"),
    ("expression_controller", "expression"),
    ("expr", "expression"),
    ("fx1", "effect1"),
    ("fx2", "effect2"),
    ("hold", "sustain"),
    ("sustain_pedal", "sustain"),
    ("damper", "sustain"),
    ("timbre", "sound_ctrl_1"),
    ("attack", "attack_time"),
    ("release", "release_time"),
    ("cutoff", "brightness"),
    ("filter_cutoff", "brightness"),
    ("reverb_level", "reverb"),
    ("reverb_send", "reverb"),
    ("chorus_level", "chorus"),
    ("chorus_send", "chorus"),
    ("tremolo_depth", "tremolo"),
    ("celeste", "detune"),
    ("phaser_depth", "phaser"),
    ("panpot", "pan"),
    ("panning", "pan"),
];

static CONTROLLER_TABLE: Lazy<SymbolTable> = Lazy::new(|| SymbolTable::new(CONTROLLERS, ALIASES));

/// Control-change number for an effect or controller name
pub fn resolve_controller(name: &str) -> Option<u8> {
    CONTROLLER_TABLE.lookup(name)
}

pub fn list_controllers() -> Vec<(&'static str, u8)> {
    CONTROLLER_TABLE.entries()
}
