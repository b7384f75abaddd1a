//! Input channel controls (`/ch/01` .. `/ch/32`).

use super::command::{ArgumentSlot, CommandTemplate, PathSegment, TemplateCategory};
use super::param::{EnumParam, NonIter, ParamType};
use crate::mapping::Unit;

pub const CHANNEL_COUNT: i32 = 32;

pub const OFF_ON: &[&str] = &["OFF", "ON"];

pub const SOURCES: &[&str] = &[
    "OFF", "In01", "In02", "In03", "In04", "In05", "In06", "In07", "In08", "In09", "In10", "In11",
    "In12", "In13", "In14", "In15", "In16", "In17", "In18", "In19", "In20", "In21", "In22", "In23",
    "In24", "In25", "In26", "In27", "In28", "In29", "In30", "In31", "In32", "Aux 1", "Aux 2",
    "Aux 3", "Aux 4", "Aux 5", "Aux 6", "USB L", "USB R", "Fx 1L", "Fx 1R", "Fx 2L", "Fx 2R",
    "Fx 3L", "Fx 3R", "Fx 4L", "Fx 4R", "Bus 01", "Bus 02", "Bus 03", "Bus 04", "Bus 05",
    "Bus 06", "Bus 07", "Bus 08", "Bus 09", "Bus 10", "Bus 11", "Bus 12", "Bus 13", "Bus 14",
    "Bus 15", "Bus 16",
];

const COLOURS: &[&str] = &[
    "OFF", "RED", "GREEN", "YELLOW", "BLUE", "MAGENTA", "CYAN", "WHITE", "OFFi", "REDi", "GREENi",
    "YELLOWi", "BLUEi", "MAGENTAi", "CYANi", "WHITEi",
];

const FILTER_TYPES: &[&str] = &["LC6", "LC12", "HC6", "HC12", "1.0", "2.0", "3.0", "5.0", "10.0"];

/// The channel number slot every channel path embeds
pub fn channel_number() -> NonIter {
    NonIter::int(
        "chNum",
        "Channel Number",
        "The number of the channel to send OSC commands to",
        1,
        1,
        CHANNEL_COUNT,
    )
    .with_path_width(2)
}

fn channel_path(suffix: &str) -> Vec<PathSegment> {
    vec![
        PathSegment::literal("/ch/"),
        PathSegment::NonIter(channel_number()),
        PathSegment::literal(suffix),
    ]
}

fn value(id: &str, suffix: &str, leaf: NonIter) -> CommandTemplate {
    CommandTemplate::new(
        id,
        TemplateCategory::Channel,
        channel_path(suffix),
        vec![ArgumentSlot::NonIter(leaf)],
    )
}

fn choice(id: &str, suffix: &str, leaf: EnumParam) -> CommandTemplate {
    CommandTemplate::new(
        id,
        TemplateCategory::Channel,
        channel_path(suffix),
        vec![ArgumentSlot::Enum(leaf)],
    )
}

#[allow(clippy::too_many_arguments)]
fn float(
    name: &str,
    verbose_name: &str,
    description: &str,
    default: f32,
    param_type: ParamType,
    min: f32,
    max: f32,
    unit: Unit,
) -> NonIter {
    NonIter::float(name, verbose_name, description, default, param_type, min, max, unit)
}

/// Every channel template, in console menu order
pub fn channel_templates() -> Vec<CommandTemplate> {
    use ParamType::{Level1024, LinF, LogF};

    vec![
        value(
            "CNAME",
            "/config/name",
            NonIter::string("chName", "Name", "The name of the channel", "", 0, 12),
        ),
        value(
            "CICON",
            "/config/icon",
            NonIter::int("chIcon", "Icon", "The index for the channel's icon", 1, 1, 74),
        )
        .with_fade(false),
        choice(
            "CCOLR",
            "/config/color",
            EnumParam::new("chColour", "Colour", "The colour of the channel", COLOURS),
        ),
        choice(
            "CSRCE",
            "/config/source",
            EnumParam::new("chSource", "Source", "The input source for this channel", SOURCES),
        ),
        choice(
            "CDLON",
            "/delay/on",
            EnumParam::new("chDelayOn", "Delay On", "Turns the channel's input delay on or off", OFF_ON),
        ),
        value(
            "CDLTM",
            "/delay/time",
            float("chDelayTime", "Delay Time", "Delay applied to the channel's input (ms)", 0.3, LinF, 0.3, 500.0, Unit::Ms),
        ),
        value(
            "CTRIM",
            "/preamp/trim",
            float("chTrim", "Trim", "Digital trim for the channel (dB)", 0.0, LinF, -18.0, 18.0, Unit::Db),
        ),
        choice(
            "CIVRT",
            "/preamp/invert",
            EnumParam::new("chInvert", "Invert On", "If the channel's signal should be inverted", OFF_ON),
        ),
        choice(
            "CHFON",
            "/preamp/hpon",
            EnumParam::new("chHPFOn", "High Pass Filter On", "Turns the channel's low cut on or off", OFF_ON),
        ),
        choice(
            "CHFSP",
            "/preamp/hpslope",
            EnumParam::new("chHPFSlope", "High Pass Filter Slope", "The slope of the channel's low cut", &["12", "18", "24"]),
        ),
        value(
            "CHFFQ",
            "/preamp/hpf",
            float("chHPFFreq", "High Pass Filter Frequency", "The channel's low cut frequency (Hz)", 20.0, LogF, 20.0, 400.0, Unit::Hertz),
        ),
        choice(
            "CGTON",
            "/gate/on",
            EnumParam::new("chGateOn", "Gate On", "Turns the channel's gate on or off", OFF_ON),
        ),
        choice(
            "CGTMD",
            "/gate/mode",
            EnumParam::new("chGateMode", "Gate Mode", "The type of gate the channel uses", &["EXP2", "EXP3", "EXP4", "GATE", "DUCK"]),
        ),
        value(
            "CGTTR",
            "/gate/thr",
            float("chGateThr", "Gate Threshold", "Level at which the gate opens (dB)", -80.0, LinF, -80.0, 0.0, Unit::Db),
        ),
        value(
            "CGTRG",
            "/gate/range",
            float("chGateRange", "Gate Range", "Attenuation applied by the gate (dB)", 60.0, LinF, 3.0, 60.0, Unit::Db),
        ),
        value(
            "CGTAK",
            "/gate/attack",
            float("chGateAttack", "Gate Attack", "Time for the gate to reach full effect (ms)", 0.0, LinF, 0.0, 120.0, Unit::Ms),
        ),
        value(
            "CGTHD",
            "/gate/hold",
            float("chGateHold", "Gate Hold", "Time the gate holds at full effect (ms)", 0.02, LogF, 0.02, 2000.0, Unit::Ms),
        ),
        value(
            "CGTRS",
            "/gate/release",
            float("chGateRelease", "Gate Release", "Time for the gate to fade to no effect (ms)", 5.0, LogF, 5.0, 4000.0, Unit::Ms),
        ),
        choice(
            "CGTKS",
            "/gate/keysrc",
            EnumParam::new("chGateKeySrc", "Gate Key Source", "The key source for the channel's gate", SOURCES),
        ),
        choice(
            "CGTFO",
            "/gate/filter/on",
            EnumParam::new("chGateFltrOn", "Gate Filter On", "Turns the gate's key filter on or off", OFF_ON),
        ),
        choice(
            "CGTFT",
            "/gate/filter/type",
            EnumParam::new("chGateFltrType", "Gate Filter Type", "The gate key filter type (solo/Q)", FILTER_TYPES),
        ),
        value(
            "CGTFF",
            "/gate/filter/f",
            float("chGateFltrFreq", "Gate Filter Frequency", "The gate key filter frequency (Hz)", 20.0, LogF, 20.0, 20000.0, Unit::Hertz),
        ),
        choice(
            "CDYON",
            "/dyn/on",
            EnumParam::new("chDynOn", "Dynamics On", "Turns the channel's compressor on or off", OFF_ON),
        ),
        choice(
            "CDYMD",
            "/dyn/mode",
            EnumParam::new("chDynMode", "Dynamics Mode", "Compressor or expander", &["COMP", "EXP"]),
        ),
        choice(
            "CDYDT",
            "/dyn/det",
            EnumParam::new("chDynDet", "Dynamics Detection", "Level detection algorithm", &["PEAK", "RMS"]),
        ),
        choice(
            "CDYEV",
            "/dyn/env",
            EnumParam::new("chDynEnv", "Dynamics Envelope", "Detector envelope", &["LIN", "LOG"]),
        ),
        value(
            "CDYTR",
            "/dyn/thr",
            float("chDynThr", "Dynamics Threshold", "Level at which the compressor acts (dB)", 0.0, LinF, -60.0, 0.0, Unit::Db),
        ),
        choice(
            "CDYRT",
            "/dyn/ratio",
            EnumParam::new(
                "chDynRatio",
                "Dynamics Ratio",
                "The compression ratio",
                &["1.1", "1.3", "1.5", "2.0", "2.5", "3.0", "4.0", "5.0", "7.0", "10", "20", "100"],
            ),
        ),
        value(
            "CDYKN",
            "/dyn/knee",
            float("chDynKnee", "Dynamics Knee", "The compressor knee", 0.0, LinF, 0.0, 5.0, Unit::None),
        ),
        value(
            "CDYMG",
            "/dyn/mgain",
            float("chDynMGain", "Dynamics Makeup Gain", "Gain applied after compression (dB)", 0.0, LinF, 0.0, 24.0, Unit::Db),
        ),
        value(
            "CDYAK",
            "/dyn/attack",
            float("chDynAttack", "Dynamics Attack", "Time for the compressor to reach full effect (ms)", 0.0, LinF, 0.0, 120.0, Unit::Ms),
        ),
        value(
            "CDYHD",
            "/dyn/hold",
            float("chDynHold", "Dynamics Hold", "Time the compressor holds at full effect (ms)", 0.02, LogF, 0.02, 2000.0, Unit::Ms),
        ),
        value(
            "CDYRS",
            "/dyn/release",
            float("chDynRelease", "Dynamics Release", "Time for the compressor to fade to no effect (ms)", 5.0, LogF, 5.0, 4000.0, Unit::Ms),
        ),
        choice(
            "CDYPS",
            "/dyn/pos",
            EnumParam::new("chDynPos", "Dynamics Position", "Compressor before or after the EQ", &["PRE", "POST"]),
        ),
        choice(
            "CDYKS",
            "/dyn/keysrc",
            EnumParam::new("chDynKeySrc", "Dynamics Key Source", "The key source for the compressor", SOURCES),
        ),
        value(
            "CDYMX",
            "/dyn/mix",
            float("chDynMix", "Dynamics Mix", "Share of the signal passed through the compressor (%)", 100.0, LinF, 0.0, 100.0, Unit::None),
        ),
        choice(
            "CDYAT",
            "/dyn/auto",
            EnumParam::new("chDynAuto", "Dynamics Auto", "Turns automatic compressor timing on or off", OFF_ON),
        ),
        choice(
            "CDYFO",
            "/dyn/filter/on",
            EnumParam::new("chDynFltrOn", "Dynamics Filter On", "Turns the compressor key filter on or off", OFF_ON),
        ),
        choice(
            "CDYFT",
            "/dyn/filter/type",
            EnumParam::new("chDynFltrType", "Dynamics Filter Type", "The compressor key filter type (solo/Q)", FILTER_TYPES),
        ),
        value(
            "CDYFF",
            "/dyn/filter/f",
            float("chDynFltrFreq", "Dynamics Filter Frequency", "The compressor key filter frequency (Hz)", 20.0, LogF, 20.0, 20000.0, Unit::Hertz),
        ),
        value(
            "CFADR",
            "/mix/fader",
            float("chFader", "Fader", "The fader level of the channel", -90.0, Level1024, -90.0, 10.0, Unit::Db),
        ),
    ]
}
