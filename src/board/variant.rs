//! Known game variants.

/// DFEN of the standard 1901 opening.
pub const STANDARD_OPENING: &str = "1901sm/Aavie,Aabud,Aftri,Eflon,Efedi,Ealvp,Ffbre,Fapar,Famar,Gfkie,Gaber,Gamun,Ifnap,Iarom,Iaven,Rfstp.sc,Ramos,Rawar,Rfsev,Tfank,Tacon,Tasmy/Abud,Atri,Avie,Eedi,Elon,Elvp,Fbre,Fmar,Fpar,Gber,Gkie,Gmun,Inap,Irom,Iven,Rmos,Rsev,Rstp,Rwar,Tank,Tcon,Tsmy,Nbel,Nbul,Nden,Ngre,Nhol,Nnwy,Npor,Nrum,Nser,Nspa,Nswe,Ntun/-";

/// A variant this crate can replay. Only the standard map is modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Standard,
}

impl Variant {
    /// Resolves a transcript's variant header, ignoring case.
    pub fn from_name(name: &str) -> Option<Variant> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Variant::Standard),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Variant::Standard => "Standard",
        }
    }

    pub const fn opening(self) -> &'static str {
        match self {
            Variant::Standard => STANDARD_OPENING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name() {
        assert_eq!(Variant::from_name("Standard"), Some(Variant::Standard));
        assert_eq!(Variant::from_name(" STANDARD "), Some(Variant::Standard));
        assert_eq!(Variant::from_name("Chaos"), None);
    }
}
