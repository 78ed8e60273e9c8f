//! Parameters edited from the control panel.
//!
//! The panel hands over text; everything is parsed and range-checked here so
//! the per-frame path only ever sees typed values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ControlError;

pub const SEGMENTATIONS_RANGE: (u32, u32) = (0, 8);
pub const SIZE_RANGE: (f32, f32) = (0.2, 5.0);
pub const WAVE_SPEED_RANGE: (f32, f32) = (0.01, 5.0);
pub const WAVE_AMPL_RANGE: (f32, f32) = (0.0, 0.5);

/// 24-bit RGB color as written by a color picker (`#rrggbb`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor(u32);

impl HexColor {
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self((u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b))
    }

    /// Normalized tint with full alpha.
    pub fn to_rgba(self) -> [f32; 4] {
        [
            ((self.0 >> 16) & 255) as f32 / 255.0,
            ((self.0 >> 8) & 255) as f32 / 255.0,
            (self.0 & 255) as f32 / 255.0,
            1.0,
        ]
    }
}

impl FromStr for HexColor {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ControlError::Color(s.to_owned()));
        }
        u32::from_str_radix(digits, 16)
            .map(HexColor)
            .map_err(|_| ControlError::Color(s.to_owned()))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Coefficients of the fractal noise evaluated in the fragment stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FbmParams {
    pub w0: f32,
    #[serde(deserialize_with = "tuple")]
    pub i_range: [f32; 3],
    #[serde(deserialize_with = "tuple")]
    pub flow_speed: [f32; 2],
    #[serde(deserialize_with = "tuple")]
    pub grad_disp: [f32; 3],
    /// Rotation angles in xyz, rotation rate in w.
    #[serde(deserialize_with = "tuple")]
    pub grad_rot: [f32; 4],
    #[serde(deserialize_with = "tuple")]
    pub octs: [f32; 3],
    pub mix_w: f32,
    #[serde(deserialize_with = "tuple")]
    pub scaling: [f32; 3],
    pub expo: f32,
}

impl Default for FbmParams {
    fn default() -> Self {
        Self {
            w0: 0.5,
            i_range: [1.0, 7.0, 1.0],
            flow_speed: [0.002, 0.0007],
            grad_disp: [0.34, 0.01, 0.005],
            grad_rot: [-1.5, -2.0, -2.5, 0.006],
            octs: [0.5, 7.0, 0.5],
            mix_w: 0.5,
            scaling: [1.7, 1.6, 0.75],
            expo: 1.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlState {
    pub base_color: HexColor,
    pub segmentations: u32,
    pub size: f32,
    /// Edge length of the noise volume. Read once at startup.
    pub noise_size: u32,
    pub wave_speed: f32,
    pub wave_ampl: f32,
    #[serde(flatten)]
    pub fbm: FbmParams,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            base_color: HexColor(0x3c0606),
            segmentations: 1,
            size: 2.0,
            noise_size: 128,
            wave_speed: 2.0,
            wave_ampl: 0.15,
            fbm: FbmParams::default(),
        }
    }
}

impl ControlState {
    /// Applies one panel edit. On error the state is left untouched.
    pub fn set(&mut self, field: &str, text: &str) -> Result<(), ControlError> {
        match field {
            "baseColor" => self.base_color = text.parse()?,
            "segmentations" => {
                let value = parse_scalar("segmentations", text)?;
                let (lo, hi) = SEGMENTATIONS_RANGE;
                self.segmentations = (value.round().max(0.0) as u32).clamp(lo, hi);
            }
            "size" => self.size = clamp(parse_scalar("size", text)?, SIZE_RANGE),
            "waveSpeed" => {
                self.wave_speed = clamp(parse_scalar("waveSpeed", text)?, WAVE_SPEED_RANGE)
            }
            "waveAmpl" => self.wave_ampl = clamp(parse_scalar("waveAmpl", text)?, WAVE_AMPL_RANGE),
            "w0" => self.fbm.w0 = parse_scalar("w0", text)?,
            "iRange" => self.fbm.i_range = parse_tuple("iRange", text)?,
            "flowSpeed" => self.fbm.flow_speed = parse_tuple("flowSpeed", text)?,
            "gradDisp" => self.fbm.grad_disp = parse_tuple("gradDisp", text)?,
            "gradRot" => self.fbm.grad_rot = parse_tuple("gradRot", text)?,
            "octs" => self.fbm.octs = parse_tuple("octs", text)?,
            "mixW" => self.fbm.mix_w = parse_scalar("mixW", text)?,
            "scaling" => self.fbm.scaling = parse_tuple("scaling", text)?,
            "expo" => self.fbm.expo = parse_scalar("expo", text)?,
            other => return Err(ControlError::UnknownField(other.to_owned())),
        }
        log::debug!("control {field} = {text}");
        Ok(())
    }
}

fn clamp(value: f32, (lo, hi): (f32, f32)) -> f32 {
    value.clamp(lo, hi)
}

/// Yields every `-?\d+(\.\d+)?` token of `text`, left to right.
pub fn numeric_tokens(text: &str) -> impl Iterator<Item = f32> + '_ {
    let bytes = text.as_bytes();
    let mut pos = 0;
    std::iter::from_fn(move || {
        while pos < bytes.len() {
            let start = pos;
            let negative = bytes[pos] == b'-';
            let digits_from = if negative { pos + 1 } else { pos };
            let mut end = digits_from;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end == digits_from {
                pos += 1;
                continue;
            }
            if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
                end += 1;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
            }
            pos = end;
            // the matched slice is ASCII digits with an optional sign and point
            if let Ok(value) = text[start..end].parse() {
                return Some(value);
            }
        }
        None
    })
}

/// Parses a textual tuple such as `"(0.002, 0.0007)"` into exactly `N` numbers.
pub fn parse_tuple<const N: usize>(field: &'static str, text: &str) -> Result<[f32; N], ControlError> {
    let tokens: Vec<f32> = numeric_tokens(text).collect();
    let values = <[f32; N]>::try_from(tokens.as_slice()).map_err(|_| ControlError::Arity {
        field,
        expected: N,
        found: tokens.len(),
        text: text.to_owned(),
    })?;
    // digit runs too long for f32 parse to infinity
    if values.iter().all(|value| value.is_finite()) {
        Ok(values)
    } else {
        Err(ControlError::NotANumber {
            field,
            text: text.to_owned(),
        })
    }
}

fn parse_scalar(field: &'static str, text: &str) -> Result<f32, ControlError> {
    text.trim()
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ControlError::NotANumber {
            field,
            text: text.to_owned(),
        })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TupleRepr {
    Text(String),
    Values(Vec<f32>),
}

/// Accepts either the panel's text form or a plain number array.
fn tuple<'de, D: Deserializer<'de>, const N: usize>(deserializer: D) -> Result<[f32; N], D::Error> {
    let values = match TupleRepr::deserialize(deserializer)? {
        TupleRepr::Text(text) => numeric_tokens(&text).collect(),
        TupleRepr::Values(values) => values,
    };
    if let Some(value) = values.iter().find(|value| !value.is_finite()) {
        return Err(serde::de::Error::custom(format!("{value} is not a finite number")));
    }
    let found = values.len();
    <[f32; N]>::try_from(values).map_err(|_| {
        serde::de::Error::custom(format!("expected {N} numbers, found {found}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_speed_parses_two_components() {
        assert_eq!(parse_tuple::<2>("flowSpeed", "(0.002, 0.0007)"), Ok([0.002, 0.0007]));
    }

    #[test]
    fn grad_rot_keeps_all_four_components() {
        assert_eq!(
            parse_tuple::<4>("gradRot", "(-1.5, -2.0, -2.5, 0.006)"),
            Ok([-1.5, -2.0, -2.5, 0.006])
        );
    }

    #[test]
    fn short_tuple_is_rejected() {
        let err = parse_tuple::<3>("iRange", "(1.0, 7.0)").unwrap_err();
        assert_eq!(
            err,
            ControlError::Arity {
                field: "iRange",
                expected: 3,
                found: 2,
                text: "(1.0, 7.0)".to_owned(),
            }
        );
    }

    #[test]
    fn overlong_digit_runs_are_not_numbers() {
        let text = format!("(1{}, 1)", "0".repeat(42));
        assert_eq!(
            parse_tuple::<2>("flowSpeed", &text),
            Err(ControlError::NotANumber {
                field: "flowSpeed",
                text: text.clone(),
            })
        );
    }

    #[test]
    fn tokens_ignore_separators_and_bare_points() {
        let tokens: Vec<f32> = numeric_tokens("[3;-4 .5 x7.25-]").collect();
        assert_eq!(tokens, vec![3.0, -4.0, 5.0, 7.25]);
    }

    #[test]
    fn hex_color_round_trips_through_display() {
        let color: HexColor = "#3c0606".parse().unwrap();
        assert_eq!(color, HexColor::from_rgb(0x3c, 0x06, 0x06));
        assert_eq!(color.to_string(), "#3c0606");
        assert!("#3c06".parse::<HexColor>().is_err());
        assert!("#zz0606".parse::<HexColor>().is_err());
    }

    #[test]
    fn failed_edit_leaves_state_unchanged() {
        let mut controls = ControlState::default();
        let before = controls.clone();
        assert!(controls.set("gradDisp", "(0.3)").is_err());
        assert!(controls.set("size", "big").is_err());
        assert!(controls.set("noiseSize", "64").is_err());
        assert_eq!(controls, before);
    }

    #[test]
    fn ranged_fields_are_clamped() {
        let mut controls = ControlState::default();
        controls.set("segmentations", "12").unwrap();
        controls.set("size", "0.01").unwrap();
        controls.set("waveAmpl", "3").unwrap();
        assert_eq!(controls.segmentations, 8);
        assert_eq!(controls.size, 0.2);
        assert_eq!(controls.wave_ampl, 0.5);
    }

    #[test]
    fn deserializes_text_and_array_tuples() {
        let controls: ControlState = serde_json::from_str(
            r##"{"baseColor": "#102030", "flowSpeed": "(0.1, 0.2)", "scaling": [1, 2, 3], "segmentations": 3}"##,
        )
        .unwrap();
        assert_eq!(controls.base_color, HexColor::from_rgb(0x10, 0x20, 0x30));
        assert_eq!(controls.fbm.flow_speed, [0.1, 0.2]);
        assert_eq!(controls.fbm.scaling, [1.0, 2.0, 3.0]);
        assert_eq!(controls.segmentations, 3);
        assert_eq!(controls.fbm.octs, FbmParams::default().octs);
    }

    #[test]
    fn non_finite_tuples_fail_to_deserialize() {
        let text = format!(r#"{{"flowSpeed": "(1{}, 1)"}}"#, "0".repeat(42));
        assert!(serde_json::from_str::<ControlState>(&text).is_err());
        // finite as f64, infinite once narrowed to f32
        assert!(serde_json::from_str::<ControlState>(r#"{"scaling": [1e39, 1, 1]}"#).is_err());
    }
}
