//! # RMC Fix
//!
//! Strongly typed content of an RMC (Recommended Minimum Navigation Information)
//! sentence and the decoder that produces it from a [`FieldSet`](crate::FieldSet).

mod decode;
pub mod parse;

pub use decode::FixDecoder;

use core::fmt;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! char_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $char:literal => $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl $name {
            /// Parses the one-letter code of this field.
            pub fn parser(i: &str) -> $crate::IResult<&str, Self> {
                let mut parser = nom::branch::alt(($(
                    nom::Parser::map(nom::character::complete::char($char), |_| Self::$variant),
                )*));
                nom::Parser::parse(&mut parser, i)
            }

            /// The one-letter code of this value.
            pub fn as_char(self) -> char {
                match self {
                    $(Self::$variant => $char,)*
                }
            }
        }
    };
}

/// Status of the fix, field 2.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// A - Data valid
    Active,
    /// Anything else - Navigation receiver warning
    Void,
}

impl Status {
    /// `A` is [`Status::Active`], every other value is [`Status::Void`].
    pub fn from_field(field: &str) -> Self {
        if field.starts_with('A') {
            Status::Active
        } else {
            Status::Void
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Active => f.write_str("Active"),
            Status::Void => f.write_str("Void"),
        }
    }
}

char_enum! {
    /// Latitude hemisphere, field 4
    pub enum LatitudeHemisphere {
        /// N - North
        'N' => North,
        /// S - South
        'S' => South,
    }
}

char_enum! {
    /// Longitude hemisphere, field 6
    pub enum LongitudeHemisphere {
        /// E - East
        'E' => East,
        /// W - West
        'W' => West,
    }
}

impl LatitudeHemisphere {
    /// Folds the hemisphere into an unsigned angle, south is negative.
    pub fn apply(self, degrees: f64) -> f64 {
        match self {
            LatitudeHemisphere::North => degrees,
            LatitudeHemisphere::South => -degrees,
        }
    }
}

impl LongitudeHemisphere {
    /// Folds the hemisphere into an unsigned angle, west is negative.
    pub fn apply(self, degrees: f64) -> f64 {
        match self {
            LongitudeHemisphere::East => degrees,
            LongitudeHemisphere::West => -degrees,
        }
    }
}

char_enum! {
    /// FAA Mode Indicator, field 12 (NMEA 2.3 and later)
    ///
    /// <https://gpsd.gitlab.io/gpsd/NMEA.html#_sentence_mixes_and_nmea_variations>
    pub enum FaaMode {
        /// A - Autonomous mode
        'A' => Autonomous,
        /// C - Quectel Querk, "Caution"
        'C' => Caution,
        /// D - Differential Mode
        'D' => Differential,
        /// E - Estimated (dead-reckoning) mode
        'E' => Estimated,
        /// F - RTK Float mode
        'F' => FloatRtk,
        /// M - Manual Input Mode
        'M' => Manual,
        /// N - Data Not Valid
        'N' => DataNotValid,
        /// P - Precise
        'P' => Precise,
        /// R - RTK Integer mode
        'R' => FixedRtk,
        /// S - Simulated Mode
        'S' => Simulator,
        /// U - Quectel Querk, "Unsafe"
        'U' => Unsafe,
    }
}

/// How a two-digit year is expanded to a full year.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CenturyRule {
    /// Adds the two-digit year to a fixed base, `Fixed(1900)` turns `94` into `1994`.
    Fixed(u16),

    /// Years at or above the pivot belong to the 1900s, the rest to the 2000s.
    ///
    /// `Pivot(83)` maps `83..=99` to `1983..=1999` and `00..=82` to `2000..=2082`.
    Pivot(u8),
}

impl CenturyRule {
    /// Every date lands in the 1900s. This is what the data logger has always
    /// written and it stays the default.
    pub const LEGACY: Self = CenturyRule::Fixed(1900);

    /// Expands a two-digit year.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nmea0183_ingest::rmc::CenturyRule;
    ///
    /// assert_eq!(CenturyRule::LEGACY.resolve(24), 1924);
    /// assert_eq!(CenturyRule::Pivot(83).resolve(24), 2024);
    /// assert_eq!(CenturyRule::Pivot(83).resolve(94), 1994);
    /// ```
    pub fn resolve(self, year: u8) -> i32 {
        let year = i32::from(year);
        match self {
            CenturyRule::Fixed(base) => i32::from(base) + year,
            CenturyRule::Pivot(pivot) if year >= i32::from(pivot) => 1900 + year,
            CenturyRule::Pivot(_) => 2000 + year,
        }
    }
}

impl Default for CenturyRule {
    fn default() -> Self {
        Self::LEGACY
    }
}

/// A decimal field passed through as received.
///
/// Keeps the original text next to its numeric value, so `003.1` is still
/// `003.1` when shown to a user.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Decimal {
    text: String,
    value: f64,
}

impl Decimal {
    pub(crate) fn new(text: &str, value: f64) -> Self {
        Self {
            text: text.to_owned(),
            value,
        }
    }

    /// The field exactly as received.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The numeric value of the field.
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One decoded RMC navigation reading.
///
/// A `Fix` has no link back to the sentence it came from. Decoding the same
/// sentence twice gives two equal values.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    /// Status Mode Indicator
    pub status: Status,
    /// Fix time in UTC, whole seconds
    pub time: time::Time,
    /// Fix date in UTC
    pub date: time::Date,
    /// Latitude in decimal degrees, south is negative
    pub latitude: f64,
    /// Longitude in decimal degrees, west is negative
    pub longitude: f64,
    /// Speed over ground in knots
    pub speed_over_ground: Option<Decimal>,
    /// Course over ground in degrees
    pub course_over_ground: Option<Decimal>,
    /// Magnetic variation in degrees
    pub magnetic_variation: Option<Decimal>,
    /// Magnetic variation direction, as received
    pub variation_hemisphere: Option<char>,
    /// FAA Mode Indicator
    pub faa_mode: Option<FaaMode>,
}

impl Fix {
    /// Fix time rendered as `HH:MM:SS`.
    pub fn time_text(&self) -> String {
        format!(
            "{:02}:{:02}:{:02}",
            self.time.hour(),
            self.time.minute(),
            self.time.second()
        )
    }

    /// Fix date rendered as `DD/MM/YYYY`.
    pub fn date_text(&self) -> String {
        format!(
            "{:02}/{:02}/{:04}",
            self.date.day(),
            u8::from(self.date.month()),
            self.date.year()
        )
    }
}

impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn text(value: &Option<Decimal>) -> &str {
            value.as_ref().map_or("-", Decimal::as_str)
        }

        let lat_hemisphere = if self.latitude.is_sign_negative() { 'S' } else { 'N' };
        let lon_hemisphere = if self.longitude.is_sign_negative() { 'W' } else { 'E' };

        writeln!(f, "Status: {}", self.status)?;
        writeln!(f, "UTC Time: {}, Date: {}", self.time_text(), self.date_text())?;
        writeln!(
            f,
            "Latitude: {:.3}° {}, Longitude: {:.3}° {}",
            self.latitude.abs(),
            lat_hemisphere,
            self.longitude.abs(),
            lon_hemisphere
        )?;
        write!(
            f,
            "Speed: {} knots, Course: {}°, Variation: {}° {}",
            text(&self.speed_over_ground),
            text(&self.course_over_ground),
            text(&self.magnetic_variation),
            self.variation_hemisphere.unwrap_or('-')
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::IResult;

    #[test]
    fn test_status() {
        assert_eq!(Status::from_field("A"), Status::Active);
        assert_eq!(Status::from_field("V"), Status::Void);
        assert_eq!(Status::from_field(""), Status::Void);
        assert_eq!(Status::from_field("a"), Status::Void);
    }

    #[test]
    fn test_hemispheres() {
        assert_eq!(
            (LatitudeHemisphere::parser("S") as IResult<_, _>).unwrap(),
            ("", LatitudeHemisphere::South)
        );
        assert_eq!(
            (LongitudeHemisphere::parser("E") as IResult<_, _>).unwrap(),
            ("", LongitudeHemisphere::East)
        );
        assert!((LatitudeHemisphere::parser("E") as IResult<_, _>).is_err());
        assert!((LongitudeHemisphere::parser("n") as IResult<_, _>).is_err());

        assert_eq!(LatitudeHemisphere::South.apply(12.5), -12.5);
        assert_eq!(LongitudeHemisphere::East.apply(12.5), 12.5);
    }

    #[test]
    fn test_faa_mode() {
        for mode in ['A', 'C', 'D', 'E', 'F', 'M', 'N', 'P', 'R', 'S', 'U'] {
            let text = mode.to_string();
            let (_, parsed): (_, FaaMode) = (FaaMode::parser(&text) as IResult<_, _>).unwrap();
            assert_eq!(parsed.as_char(), mode);
        }
        assert!((FaaMode::parser("X") as IResult<_, _>).is_err());
    }

    #[test]
    fn test_century_rule_fixed_base() {
        assert_eq!(CenturyRule::Fixed(2000).resolve(0), 2000);
        assert_eq!(CenturyRule::default(), CenturyRule::LEGACY);
        assert_eq!(CenturyRule::LEGACY.resolve(99), 1999);
    }

    #[test]
    fn test_century_rule_pivot_edges() {
        assert_eq!(CenturyRule::Pivot(83).resolve(83), 1983);
        assert_eq!(CenturyRule::Pivot(83).resolve(82), 2082);
        assert_eq!(CenturyRule::Pivot(0).resolve(0), 1900);
    }
}
