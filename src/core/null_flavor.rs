use std::fmt;

/// HL7 `nullFlavor` codes: why a value is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NullFlavor {
    NoInformation,
    NotApplicable,
    Unknown,
    AskedButNotKnown,
    TemporarilyUnavailable,
    NotAsked,
    Masked,
    NoMatchingCode,
    Other(String),
}

impl NullFlavor {
    pub fn from_code(code: &str) -> Self {
        match code {
            "NI" => Self::NoInformation,
            "NA" => Self::NotApplicable,
            "UNK" => Self::Unknown,
            "ASKU" => Self::AskedButNotKnown,
            "NAV" => Self::TemporarilyUnavailable,
            "NASK" => Self::NotAsked,
            "MSK" => Self::Masked,
            "OTH" => Self::NoMatchingCode,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::NoInformation => "NI",
            Self::NotApplicable => "NA",
            Self::Unknown => "UNK",
            Self::AskedButNotKnown => "ASKU",
            Self::TemporarilyUnavailable => "NAV",
            Self::NotAsked => "NASK",
            Self::Masked => "MSK",
            Self::NoMatchingCode => "OTH",
            Self::Other(code) => code,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::NoInformation => "No Information",
            Self::NotApplicable => "Not Applicable",
            Self::Unknown => "Unknown",
            Self::AskedButNotKnown => "Asked But Not Known",
            Self::TemporarilyUnavailable => "Temporarily Unavailable",
            Self::NotAsked => "Not Asked",
            Self::Masked => "Masked",
            Self::NoMatchingCode => "No Matching Code",
            Self::Other(_) => "NullFlavor",
        }
    }
}

impl fmt::Display for NullFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
