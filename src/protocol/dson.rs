//! DSON order notation with an issuing-power prefix.
//!
//! `A: A bud - ser`, `R: F stp/sc S A mos - lvn`, `T: A bul R rum`,
//! `E: W`. The prefix is the power's DUI character; coasts use `/`.

use thiserror::Error;

use crate::board::order::{Location, Order, OrderUnit};
use crate::board::province::{Coast, Power, Province};
use crate::board::unit::UnitType;

/// Errors that can occur when parsing DSON order strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DsonError {
    #[error("empty input")]
    EmptyInput,

    #[error("missing or unknown power prefix in '{0}'")]
    BadPower(String),

    #[error("unknown unit type '{0}'")]
    UnknownUnitType(String),

    #[error("unknown province '{0}'")]
    UnknownProvince(String),

    #[error("unknown coast '{0}'")]
    UnknownCoast(String),

    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("unexpected end of input, expected {0}")]
    UnexpectedEnd(&'static str),

    #[error("unexpected token '{found}', expected {expected}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
    },
}

struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn next(&mut self, expected: &'static str) -> Result<&'a str, DsonError> {
        self.inner.next().ok_or(DsonError::UnexpectedEnd(expected))
    }

    fn expect(&mut self, want: &'static str) -> Result<(), DsonError> {
        let found = self.next(want)?;
        if found == want {
            Ok(())
        } else {
            Err(DsonError::UnexpectedToken {
                expected: want,
                found: found.to_string(),
            })
        }
    }

    fn location(&mut self) -> Result<Location, DsonError> {
        let token = self.next("province")?;
        let (prov_str, coast) = match token.split_once('/') {
            Some((p, c)) => (
                p,
                Coast::from_abbr(c).ok_or_else(|| DsonError::UnknownCoast(c.to_string()))?,
            ),
            None => (token, Coast::None),
        };
        let province = Province::from_abbr(prov_str)
            .ok_or_else(|| DsonError::UnknownProvince(prov_str.to_string()))?;
        Ok(Location::with_coast(province, coast))
    }

    fn unit(&mut self) -> Result<OrderUnit, DsonError> {
        let token = self.next("unit type")?;
        let unit_type = match token.chars().collect::<Vec<_>>().as_slice() {
            [c] => UnitType::from_dson_char(*c),
            _ => None,
        }
        .ok_or_else(|| DsonError::UnknownUnitType(token.to_string()))?;
        Ok(OrderUnit::new(unit_type, self.location()?))
    }
}

/// Parses one `<P>: <order>` string.
///
/// Transcripts are read through the order factory in
/// `transcript::orders`; this compact form is for hand-written fixtures
/// and for reading back what [`format_order`] writes.
pub fn parse_order(s: &str) -> Result<Order, DsonError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(DsonError::EmptyInput);
    }
    let (prefix, body) = s.split_once(':').ok_or_else(|| DsonError::BadPower(s.to_string()))?;
    let mut prefix_chars = prefix.trim().chars();
    let power = match (prefix_chars.next(), prefix_chars.next()) {
        (Some(c), None) => Power::from_dui_char(c),
        _ => None,
    }
    .ok_or_else(|| DsonError::BadPower(s.to_string()))?;

    let mut t = Tokens {
        inner: body.split_whitespace(),
    };
    if body.trim() == "W" {
        return Ok(Order::Waive { power });
    }

    let unit = t.unit()?;
    let order = match t.next("action (H, -, S, C, R, D, B)")? {
        "H" => Order::Hold { power, unit },
        "-" => Order::Move {
            power,
            unit,
            dest: t.location()?,
        },
        "S" => {
            let supported = t.unit()?;
            match t.next("H or -")? {
                "H" => Order::SupportHold {
                    power,
                    unit,
                    supported,
                },
                "-" => Order::SupportMove {
                    power,
                    unit,
                    supported,
                    dest: t.location()?,
                },
                other => {
                    return Err(DsonError::UnexpectedToken {
                        expected: "H or -",
                        found: other.to_string(),
                    })
                }
            }
        }
        "C" => {
            t.expect("A")?;
            let convoyed_from = t.location()?;
            t.expect("-")?;
            Order::Convoy {
                power,
                unit,
                convoyed_from,
                convoyed_to: t.location()?,
            }
        }
        "R" => Order::Retreat {
            power,
            unit,
            dest: t.location()?,
        },
        "D" => Order::Disband { power, unit },
        "B" => Order::Build { power, unit },
        other => return Err(DsonError::UnknownAction(other.to_string())),
    };
    Ok(order)
}

fn format_location(loc: &Location) -> String {
    match loc.coast {
        Coast::None => loc.province.abbr().to_string(),
        c => format!("{}/{}", loc.province.abbr(), c.abbr()),
    }
}

fn format_unit(unit: &OrderUnit) -> String {
    format!("{} {}", unit.unit_type.dson_char(), format_location(&unit.location))
}

/// Formats an order as canonical DSON with its power prefix.
pub fn format_order(order: &Order) -> String {
    let body = match order {
        Order::Hold { unit, .. } => format!("{} H", format_unit(unit)),
        Order::Move { unit, dest, .. } => format!("{} - {}", format_unit(unit), format_location(dest)),
        Order::SupportHold { unit, supported, .. } => {
            format!("{} S {} H", format_unit(unit), format_unit(supported))
        }
        Order::SupportMove {
            unit,
            supported,
            dest,
            ..
        } => format!(
            "{} S {} - {}",
            format_unit(unit),
            format_unit(supported),
            format_location(dest)
        ),
        Order::Convoy {
            unit,
            convoyed_from,
            convoyed_to,
            ..
        } => format!(
            "{} C A {} - {}",
            format_unit(unit),
            format_location(convoyed_from),
            format_location(convoyed_to)
        ),
        Order::Retreat { unit, dest, .. } => format!("{} R {}", format_unit(unit), format_location(dest)),
        Order::Disband { unit, .. } => format!("{} D", format_unit(unit)),
        Order::Build { unit, .. } => format!("{} B", format_unit(unit)),
        Order::Waive { .. } => "W".to_string(),
    };
    format!("{}: {}", order.power().dui_char(), body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fleet(prov: Province, coast: Coast) -> OrderUnit {
        OrderUnit::new(UnitType::Fleet, Location::with_coast(prov, coast))
    }

    #[test]
    fn parse_move_and_support() {
        let mv = parse_order("A: A bud - ser").expect("parses");
        assert_eq!(
            mv,
            Order::Move {
                power: Power::Austria,
                unit: OrderUnit::new(UnitType::Army, Location::new(Province::Bud)),
                dest: Location::new(Province::Ser),
            }
        );

        let sup = parse_order("R: F stp/sc S A mos - lvn").expect("parses");
        match sup {
            Order::SupportMove {
                power,
                unit,
                supported,
                dest,
            } => {
                assert_eq!(power, Power::Russia);
                assert_eq!(unit, fleet(Province::Stp, Coast::South));
                assert_eq!(supported.location.province, Province::Mos);
                assert_eq!(dest.province, Province::Lvn);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parse_adjustments() {
        assert_eq!(
            parse_order("E: W").expect("parses"),
            Order::Waive {
                power: Power::England
            }
        );
        assert!(matches!(
            parse_order("G: W kie B").expect("parses"),
            Order::Build { unit, .. } if unit.unit_type == UnitType::Wing
        ));
    }

    #[test]
    fn format_roundtrips_representative_orders() {
        for text in [
            "A: A vie H",
            "T: F bla - bul/ec",
            "E: F nth C A lon - nwy",
            "I: A ven S A tri H",
            "T: A bul R rum",
            "F: F bre D",
            "G: A mun B",
            "R: W",
        ] {
            let order = parse_order(text).expect(text);
            assert_eq!(format_order(&order), text);
        }
    }

    #[test]
    fn errors() {
        assert_eq!(parse_order("   "), Err(DsonError::EmptyInput));
        assert!(matches!(parse_order("A bud - ser"), Err(DsonError::BadPower(_))));
        assert!(matches!(parse_order("A: Z bud H"), Err(DsonError::UnknownUnitType(_))));
        assert!(matches!(parse_order("A: A xyz H"), Err(DsonError::UnknownProvince(_))));
        assert!(matches!(parse_order("A: A bud X"), Err(DsonError::UnknownAction(_))));
        assert_eq!(parse_order("A: A bud -"), Err(DsonError::UnexpectedEnd("province")));
    }
}
