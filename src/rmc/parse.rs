//! Field parsers for the textual RMC subfields.
//!
//! Each parser handles the content of exactly one field. The decoder wraps them in
//! `all_consuming`, so trailing garbage in a field is an error.

use nom::{
    Parser,
    combinator::map_res,
    error::{ErrorKind, ParseError},
};

use crate::{
    Error, IResult,
    parsing::{fixed_point, fraction, number},
    rmc::{CenturyRule, Decimal},
};

/// Error type of every field parser.
pub type FieldError<'a> = Error<&'a str, nom::error::Error<&'a str>>;

/// Parses an angle written as degrees and minutes, `D..DMM.MMMM`.
///
/// The first `width` digits are the degrees, the next two digits and the optional
/// fraction are the minutes. The split is made on digit count, so a three-digit
/// longitude such as `12311.12` keeps all of its degrees.
///
/// # Examples
///
/// ```rust
/// use nmea0183_ingest::rmc::parse::degrees_minutes;
/// use nom::Parser;
///
/// let (_, longitude) = degrees_minutes(3).parse("12311.12").unwrap();
/// assert!((longitude - (123.0 + 11.12 / 60.0)).abs() < 1e-9);
/// ```
pub fn degrees_minutes<'a>(width: usize) -> impl Parser<&'a str, Output = f64, Error = FieldError<'a>> {
    (
        number::<u16, _>(width),
        map_res(fixed_point(2), str::parse::<f64>),
    )
        .map(|(degrees, minutes)| f64::from(degrees) + minutes / 60.0)
}

/// Latitude magnitude, `DDMM.MMMM`.
pub fn latitude(i: &str) -> IResult<&str, f64> {
    degrees_minutes(2).parse(i)
}

/// Longitude magnitude, `DDDMM.MMMM`.
pub fn longitude(i: &str) -> IResult<&str, f64> {
    degrees_minutes(3).parse(i)
}

/// UTC time of day, `HHMMSS` with an optional fractional second.
///
/// The fraction is validated but not kept. A leap second (`60`) has no
/// [`time::Time`] representation and is [`OutOfRange`](Error::OutOfRange).
///
/// # Examples
///
/// ```rust
/// use nmea0183_ingest::rmc::parse::utc_time;
///
/// let (_, time) = utc_time("123519.75").unwrap();
/// assert_eq!(time, time::Time::from_hms(12, 35, 19).unwrap());
/// ```
pub fn utc_time(i: &str) -> IResult<&str, time::Time> {
    let (rest, (hour, minute, second, _)) =
        (two_digits, two_digits, two_digits, fraction).parse(i)?;

    let time = time::Time::from_hms(hour, minute, second)
        .map_err(|_| nom::Err::Error(Error::OutOfRange(i)))?;

    Ok((rest, time))
}

/// UTC date, `DDMMYY`, with the year expanded by `century`.
///
/// # Examples
///
/// ```rust
/// use nmea0183_ingest::rmc::{CenturyRule, parse::utc_date};
/// use nom::Parser;
///
/// let (_, date) = utc_date(CenturyRule::LEGACY).parse("230394").unwrap();
/// assert_eq!(date, time::Date::from_calendar_date(1994, time::Month::March, 23).unwrap());
/// ```
pub fn utc_date<'a>(
    century: CenturyRule,
) -> impl Parser<&'a str, Output = time::Date, Error = FieldError<'a>> {
    move |i: &'a str| -> IResult<&'a str, time::Date> {
        let (rest, (day, month, year)) = (two_digits, two_digits, two_digits).parse(i)?;

        let month =
            time::Month::try_from(month).map_err(|_| nom::Err::Error(Error::OutOfRange(i)))?;
        let date = time::Date::from_calendar_date(century.resolve(year), month, day)
            .map_err(|_| nom::Err::Error(Error::OutOfRange(i)))?;

        Ok((rest, date))
    }
}

fn two_digits(i: &str) -> IResult<&str, u8> {
    number(2).parse(i)
}

/// A plain decimal number, kept as received.
///
/// An optional sign, whole digits and an optional fraction, with at least one digit
/// overall. Exponents are not part of NMEA and are not accepted.
///
/// # Examples
///
/// ```rust
/// use nmea0183_ingest::rmc::parse::decimal;
///
/// let (_, speed) = decimal("022.4").unwrap();
/// assert_eq!(speed.as_str(), "022.4");
/// assert_eq!(speed.value(), 22.4);
/// ```
pub fn decimal(i: &str) -> IResult<&str, Decimal> {
    let sign = usize::from(i.starts_with(['+', '-']));
    let whole = i[sign..].bytes().take_while(u8::is_ascii_digit).count();
    let (rest, fraction) = fraction::<nom::error::Error<&str>>(&i[sign + whole..])?;

    let text = &i[..i.len() - rest.len()];
    let no_digits = whole == 0 && fraction.is_none_or(str::is_empty);
    match text.parse::<f64>() {
        Ok(value) if !no_digits => Ok((rest, Decimal::new(text, value))),
        _ => Err(nom::Err::Error(Error::from_error_kind(i, ErrorKind::Float))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_latitude() {
        let (rest, lat) = latitude("4807.038").unwrap();
        assert_eq!(rest, "");
        assert!(close(lat, 48.1173));

        let (_, lat) = latitude("0000.000").unwrap();
        assert_eq!(lat, 0.0);

        let (_, lat) = latitude("9000").unwrap();
        assert_eq!(lat, 90.0);
    }

    #[test]
    fn test_longitude_three_digit_degrees() {
        let (_, lon) = longitude("01131.000").unwrap();
        assert!(close(lon, 11.0 + 31.0 / 60.0));

        let (_, lon) = longitude("17959.999").unwrap();
        assert!(close(lon, 179.0 + 59.999 / 60.0));

        let (_, lon) = longitude("12311.12").unwrap();
        assert!(close(lon, 123.0 + 11.12 / 60.0));
    }

    #[test]
    fn test_minutes_keep_their_fraction() {
        let (_, lat) = latitude("3351.000").unwrap();
        assert!(close(lat, 33.85));

        let (_, lat) = latitude("0000.6").unwrap();
        assert!(close(lat, 0.01));

        let (_, lon) = degrees_minutes(3).parse("00000.06").unwrap();
        assert!(close(lon, 0.001));
    }

    #[test]
    fn test_coordinate_rejects_wrong_width() {
        // a latitude written without its leading zero
        assert!(latitude("807.038").is_err());
        assert!(longitude("1131.000").is_err());
        assert!(latitude("48O7.038").is_err());
        assert!(latitude("-4807.038").is_err());
    }

    #[test]
    fn test_utc_time_out_of_range() {
        assert_eq!(
            utc_time("246000"),
            Err(nom::Err::Error(Error::OutOfRange("246000")))
        );
        assert_eq!(
            utc_time("236100"),
            Err(nom::Err::Error(Error::OutOfRange("236100")))
        );
    }

    #[test]
    fn test_utc_time_malformed() {
        assert!(utc_time("1235").is_err());
        assert!(utc_time("12:35:19").is_err());
    }

    #[test]
    fn test_utc_date_calendar() {
        let (_, date) = utc_date(CenturyRule::Pivot(83)).parse("290224").unwrap();
        assert_eq!(
            date,
            time::Date::from_calendar_date(2024, time::Month::February, 29).unwrap()
        );

        let result = utc_date(CenturyRule::LEGACY).parse("290223");
        assert_eq!(result, Err(nom::Err::Error(Error::OutOfRange("290223"))));

        let result = utc_date(CenturyRule::LEGACY).parse("011394");
        assert_eq!(result, Err(nom::Err::Error(Error::OutOfRange("011394"))));
    }

    #[test]
    fn test_decimal_rejects_words() {
        assert!(decimal("abc").is_err());
        assert!(decimal("").is_err());

        assert!(decimal(".").is_err());
        assert!(decimal("-").is_err());

        let (rest, _) = decimal("1.5x").unwrap();
        assert_eq!(rest, "x");

        let (rest, speed) = decimal("022.4").unwrap();
        assert_eq!((rest, speed.as_str()), ("", "022.4"));

        let (_, variation) = decimal("-.5").unwrap();
        assert_eq!(variation.value(), -0.5);
    }
}
