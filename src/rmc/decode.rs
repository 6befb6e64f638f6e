use nom::{Parser, combinator::all_consuming};

use crate::{
    DecodeError, Error, FieldSet, RMC_MIN_FIELDS,
    rmc::{
        CenturyRule, FaaMode, Fix, LatitudeHemisphere, LongitudeHemisphere, Status,
        parse::{self, FieldError},
    },
};

/// Position and name of one RMC field.
#[derive(Clone, Copy)]
struct Field {
    index: usize,
    name: &'static str,
}

const TIME: Field = Field { index: 1, name: "time" };
const STATUS: Field = Field { index: 2, name: "status" };
const LATITUDE: Field = Field { index: 3, name: "latitude" };
const LATITUDE_HEMISPHERE: Field = Field { index: 4, name: "latitude hemisphere" };
const LONGITUDE: Field = Field { index: 5, name: "longitude" };
const LONGITUDE_HEMISPHERE: Field = Field { index: 6, name: "longitude hemisphere" };
const SPEED: Field = Field { index: 7, name: "speed over ground" };
const COURSE: Field = Field { index: 8, name: "course over ground" };
const DATE: Field = Field { index: 9, name: "date" };
const VARIATION: Field = Field { index: 10, name: "magnetic variation" };
const VARIATION_HEMISPHERE: Field = Field { index: 11, name: "variation hemisphere" };
const FAA_MODE: Field = Field { index: 12, name: "FAA mode" };

impl Field {
    fn text<'a>(self, fields: &FieldSet<'a>) -> &'a str {
        fields.get(self.index).unwrap_or_default()
    }

    fn parse<'a, O, P>(self, text: &'a str, parser: P) -> Result<O, DecodeError>
    where
        P: Parser<&'a str, Output = O, Error = FieldError<'a>>,
    {
        match all_consuming(parser).parse(text) {
            Ok((_, value)) => Ok(value),
            Err(nom::Err::Error(Error::OutOfRange(_)) | nom::Err::Failure(Error::OutOfRange(_))) => {
                Err(DecodeError::OutOfRange {
                    index: self.index,
                    name: self.name,
                    text: text.to_owned(),
                })
            }
            Err(_) => Err(DecodeError::InvalidField {
                index: self.index,
                name: self.name,
                text: text.to_owned(),
            }),
        }
    }

    fn required<'a, O, P>(self, fields: &FieldSet<'a>, parser: P) -> Result<O, DecodeError>
    where
        P: Parser<&'a str, Output = O, Error = FieldError<'a>>,
    {
        match self.text(fields) {
            "" => Err(DecodeError::EmptyField {
                index: self.index,
                name: self.name,
            }),
            text => self.parse(text, parser),
        }
    }

    fn optional<'a, O, P>(self, fields: &FieldSet<'a>, parser: P) -> Result<Option<O>, DecodeError>
    where
        P: Parser<&'a str, Output = O, Error = FieldError<'a>>,
    {
        match self.text(fields) {
            "" => Ok(None),
            text => self.parse(text, parser).map(Some),
        }
    }
}

/// Converts the fields of an RMC sentence into a [`Fix`].
///
/// <https://gpsd.gitlab.io/gpsd/NMEA.html#_rmc_recommended_minimum_navigation_information>
///
/// ```text
///         1         2 3       4 5        6  7   8   9    10 11
///         |         | |       | |        |  |   |   |    |  |
///  $--RMC,hhmmss.ss,A,ddmm.mm,a,dddmm.mm,a,x.x,x.x,xxxx,x.x,a*hh<CR><LF>
/// ```
///
/// NMEA 2.3 adds the FAA mode as field 12, which is decoded when present.
///
/// Time, position and date are required: an empty or malformed value fails the
/// whole fix. Speed, course and magnetic variation are passed through and may be
/// empty. A fix is either complete or not produced at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixDecoder {
    century: CenturyRule,
}

impl FixDecoder {
    /// Creates a decoder that expands two-digit years with `century`.
    pub fn new(century: CenturyRule) -> Self {
        Self { century }
    }

    /// Decodes one field set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nmea0183_ingest::{FieldSet, rmc::{FixDecoder, Status}};
    ///
    /// let fields =
    ///     FieldSet::split("$GPRMC,225446,A,4916.45,N,12311.12,W,000.5,054.7,191194,020.3,E")
    ///         .unwrap();
    /// let fix = FixDecoder::default().decode(&fields).unwrap();
    ///
    /// assert_eq!(fix.status, Status::Active);
    /// assert_eq!(fix.date_text(), "19/11/1994");
    /// assert!(fix.longitude < -123.0);
    /// ```
    pub fn decode(&self, fields: &FieldSet<'_>) -> Result<Fix, DecodeError> {
        if fields.len() < RMC_MIN_FIELDS {
            return Err(DecodeError::FieldCount {
                found: fields.len(),
                required: RMC_MIN_FIELDS,
            });
        }

        let time = TIME.required(fields, parse::utc_time)?;
        let status = Status::from_field(STATUS.text(fields));

        let latitude = LATITUDE.required(fields, parse::latitude)?;
        let latitude_hemisphere =
            LATITUDE_HEMISPHERE.required(fields, LatitudeHemisphere::parser)?;
        let longitude = LONGITUDE.required(fields, parse::longitude)?;
        let longitude_hemisphere =
            LONGITUDE_HEMISPHERE.required(fields, LongitudeHemisphere::parser)?;

        let speed_over_ground = SPEED.optional(fields, parse::decimal)?;
        let course_over_ground = COURSE.optional(fields, parse::decimal)?;
        let date = DATE.required(fields, parse::utc_date(self.century))?;
        let magnetic_variation = VARIATION.optional(fields, parse::decimal)?;
        let variation_hemisphere = VARIATION_HEMISPHERE.text(fields).chars().next();
        let faa_mode = FAA_MODE.optional(fields, FaaMode::parser)?;

        Ok(Fix {
            status,
            time,
            date,
            latitude: latitude_hemisphere.apply(latitude),
            longitude: longitude_hemisphere.apply(longitude),
            speed_over_ground,
            course_over_ground,
            magnetic_variation,
            variation_hemisphere,
            faa_mode,
        })
    }
}
