//! # Parsing Utilities
//!
//! Small `nom` building blocks shared by the RMC field decoders. All of them work on
//! `&str` fields that have already been split out of a sentence.

use std::str::FromStr;

use nom::{
    Parser,
    bytes::complete::take,
    combinator::{map_res, verify},
    error::{FromExternalError, ParseError},
};

use crate::Error;

/// Takes exactly `count` ASCII digits.
///
/// # Examples
///
/// ```rust
/// use nmea0183_ingest::{IResult, parsing::digits};
/// use nom::Parser;
///
/// let result: IResult<_, _> = digits(2).parse("4807.038");
/// assert_eq!(result, Ok(("07.038", "48")));
///
/// let result: IResult<_, _> = digits(2).parse("4a07");
/// assert!(result.is_err());
/// ```
pub fn digits<'a, E>(count: usize) -> impl Parser<&'a str, Output = &'a str, Error = Error<&'a str, E>>
where
    E: ParseError<&'a str>,
{
    verify(take(count), |s: &str| s.bytes().all(|b| b.is_ascii_digit()))
}

/// Takes exactly `count` ASCII digits and converts them to a number.
///
/// # Examples
///
/// ```rust
/// use nmea0183_ingest::{IResult, parsing::number};
/// use nom::Parser;
///
/// let result: IResult<_, u16> = number(3).parse("01131.000");
/// assert_eq!(result, Ok(("31.000", 11)));
/// ```
pub fn number<'a, T, E>(count: usize) -> impl Parser<&'a str, Output = T, Error = Error<&'a str, E>>
where
    T: FromStr,
    E: ParseError<&'a str> + FromExternalError<&'a str, <T as FromStr>::Err>,
{
    map_res(digits(count), str::parse::<T>)
}

/// Recognises an optional fractional suffix, a `.` followed by any number of digits.
///
/// Returns the digits after the point, or [`None`] when there is no point at all.
///
/// # Examples
///
/// ```rust
/// use nmea0183_ingest::{IResult, parsing::fraction};
///
/// let result: IResult<_, _> = fraction(".75");
/// assert_eq!(result, Ok(("", Some("75"))));
///
/// let result: IResult<_, _> = fraction("");
/// assert_eq!(result, Ok(("", None)));
/// ```
pub fn fraction<'a, E>(i: &'a str) -> nom::IResult<&'a str, Option<&'a str>, Error<&'a str, E>>
where
    E: ParseError<&'a str>,
{
    let Some(after) = i.strip_prefix('.') else {
        return Ok((i, None));
    };

    let len = after.bytes().take_while(u8::is_ascii_digit).count();
    Ok((&after[len..], Some(&after[..len])))
}

/// Recognises `count` whole digits followed by an optional fraction and returns the
/// matched text as a whole, e.g. the minutes part `07.038` of a latitude.
///
/// # Examples
///
/// ```rust
/// use nmea0183_ingest::{IResult, parsing::fixed_point};
/// use nom::Parser;
///
/// let result: IResult<_, _> = fixed_point(2).parse("07.038");
/// assert_eq!(result, Ok(("", "07.038")));
///
/// let result: IResult<_, _> = fixed_point(2).parse("7.038");
/// assert!(result.is_err());
/// ```
pub fn fixed_point<'a, E>(
    count: usize,
) -> impl Parser<&'a str, Output = &'a str, Error = Error<&'a str, E>>
where
    E: ParseError<&'a str>,
{
    move |i: &'a str| -> nom::IResult<&'a str, &'a str, Error<&'a str, E>> {
        let (rest, _) = digits::<E>(count).parse(i)?;
        let (rest, _) = fraction::<E>(rest)?;
        Ok((rest, &i[..i.len() - rest.len()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IResult;
    use nom::combinator::all_consuming;

    #[test]
    fn test_number_rejects_short_input() {
        let result: IResult<_, u8> = number(2).parse("1");
        assert!(result.is_err());
    }

    #[test]
    fn test_number_rejects_sign() {
        let result: IResult<_, u8> = number(2).parse("+1");
        assert!(result.is_err());
    }

    #[test]
    fn test_fraction_without_digits() {
        let result: IResult<_, _> = fraction(".");
        assert_eq!(result, Ok(("", Some(""))));
    }

    #[test]
    fn test_fixed_point_keeps_fraction_at_end_of_input() {
        let result: IResult<_, _> = fixed_point(2).parse("07.038");
        assert_eq!(result, Ok(("", "07.038")));

        let result: IResult<_, _> = fixed_point(3).parse("012.");
        assert_eq!(result, Ok(("", "012.")));

        let result: IResult<_, _> = all_consuming(fixed_point(2)).parse("51.000");
        assert_eq!(result, Ok(("", "51.000")));
    }

    #[test]
    fn test_fixed_point_stops_at_second_point() {
        let result: IResult<_, _> = fixed_point(2).parse("12.5.1");
        assert_eq!(result, Ok((".1", "12.5")));

        let result: IResult<_, _> = all_consuming(fixed_point(2)).parse("12.5.1");
        assert!(result.is_err());
    }
}
