// 🌍 Country Code Resolver - alpha-2 / ISO numeric / Eurostat / aggregates
//
// Sources disagree on how a country is keyed:
// - Geographic boundary data uses ISO 3166-1 numeric ("276")
// - Energy datasets use alpha-2 ("DE"), but Eurostat writes Greece as "EL" and
//   the United Kingdom as "UK"
// - Trade partner lists mix in regional aggregates ("EU27_2020", "WORLD") that are
//   valid keys but are not countries
//
// The resolver owns the static tables and answers every lookup with Option/bool.
// A miss is never an error.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ============================================================================
// STATIC TABLES
// ============================================================================

/// ISO 3166-1 numeric → alpha-2
pub const NUMERIC_TO_ALPHA2: &[(&str, &str)] = &[
    ("008", "AL"),
    ("020", "AD"),
    ("040", "AT"),
    ("056", "BE"),
    ("070", "BA"),
    ("100", "BG"),
    ("112", "BY"),
    ("191", "HR"),
    ("196", "CY"),
    ("203", "CZ"),
    ("208", "DK"),
    ("233", "EE"),
    ("246", "FI"),
    ("250", "FR"),
    ("276", "DE"),
    ("300", "GR"),
    ("348", "HU"),
    ("352", "IS"),
    ("372", "IE"),
    ("380", "IT"),
    ("428", "LV"),
    ("438", "LI"),
    ("440", "LT"),
    ("442", "LU"),
    ("807", "MK"),
    ("470", "MT"),
    ("498", "MD"),
    ("492", "MC"),
    ("499", "ME"),
    ("528", "NL"),
    ("578", "NO"),
    ("616", "PL"),
    ("620", "PT"),
    ("642", "RO"),
    ("643", "RU"),
    ("674", "SM"),
    ("688", "RS"),
    ("703", "SK"),
    ("705", "SI"),
    ("724", "ES"),
    ("752", "SE"),
    ("756", "CH"),
    ("804", "UA"),
    ("826", "GB"),
    ("336", "VA"),
    ("012", "DZ"),
    ("024", "AO"),
    ("031", "AZ"),
    ("032", "AR"),
    ("036", "AU"),
    ("048", "BH"),
    ("076", "BR"),
    ("096", "BN"),
    ("124", "CA"),
    ("156", "CN"),
    ("170", "CO"),
    ("178", "CG"),
    ("180", "CD"),
    ("218", "EC"),
    ("818", "EG"),
    ("226", "GQ"),
    ("266", "GA"),
    ("268", "GE"),
    ("288", "GH"),
    ("356", "IN"),
    ("360", "ID"),
    ("364", "IR"),
    ("368", "IQ"),
    ("376", "IL"),
    ("392", "JP"),
    ("398", "KZ"),
    ("400", "JO"),
    ("414", "KW"),
    ("422", "LB"),
    ("434", "LY"),
    ("458", "MY"),
    ("484", "MX"),
    ("504", "MA"),
    ("508", "MZ"),
    ("516", "NA"),
    ("566", "NG"),
    ("512", "OM"),
    ("586", "PK"),
    ("608", "PH"),
    ("634", "QA"),
    ("682", "SA"),
    ("702", "SG"),
    ("710", "ZA"),
    ("410", "KR"),
    ("729", "SD"),
    ("728", "SS"),
    ("760", "SY"),
    ("764", "TH"),
    ("780", "TT"),
    ("788", "TN"),
    ("792", "TR"),
    ("795", "TM"),
    ("784", "AE"),
    ("840", "US"),
    ("860", "UZ"),
    ("862", "VE"),
    ("704", "VN"),
    ("887", "YE"),
    ("004", "AF"),
    ("050", "BD"),
    ("064", "BT"),
    ("068", "BO"),
    ("072", "BW"),
    ("084", "BZ"),
    ("090", "SB"),
    ("104", "MM"),
    ("108", "BI"),
    ("116", "KH"),
    ("120", "CM"),
    ("132", "CV"),
    ("140", "CF"),
    ("144", "LK"),
    ("148", "TD"),
    ("152", "CL"),
    ("158", "TW"),
    ("174", "KM"),
    ("188", "CR"),
    ("192", "CU"),
    ("204", "BJ"),
    ("214", "DO"),
    ("222", "SV"),
    ("231", "ET"),
    ("232", "ER"),
    ("242", "FJ"),
    ("262", "DJ"),
    ("270", "GM"),
    ("275", "PS"),
    ("292", "GI"),
    ("296", "KI"),
    ("308", "GD"),
    ("320", "GT"),
    ("324", "GN"),
    ("328", "GY"),
    ("332", "HT"),
    ("340", "HN"),
    ("344", "HK"),
    ("384", "CI"),
    ("388", "JM"),
    ("404", "KE"),
    ("408", "KP"),
    ("417", "KG"),
    ("418", "LA"),
    ("426", "LS"),
    ("430", "LR"),
    ("446", "MO"),
    ("450", "MG"),
    ("454", "MW"),
    ("462", "MV"),
    ("466", "ML"),
    ("478", "MR"),
    ("480", "MU"),
    ("496", "MN"),
    ("524", "NP"),
    ("540", "NC"),
    ("548", "VU"),
    ("554", "NZ"),
    ("558", "NI"),
    ("562", "NE"),
    ("591", "PA"),
    ("598", "PG"),
    ("600", "PY"),
    ("604", "PE"),
    ("638", "RE"),
    ("646", "RW"),
    ("662", "LC"),
    ("678", "ST"),
    ("686", "SN"),
    ("694", "SL"),
    ("706", "SO"),
    ("716", "ZW"),
    ("732", "EH"),
    ("740", "SR"),
    ("748", "SZ"),
    ("762", "TJ"),
    ("834", "TZ"),
    ("768", "TG"),
    ("776", "TO"),
    ("800", "UG"),
    ("854", "BF"),
    ("858", "UY"),
    ("882", "WS"),
    ("894", "ZM"),
    ("926", "XK"),
];

/// Eurostat special codes → standard alpha-2 (input direction only)
pub const EUROSTAT_TO_STANDARD: &[(&str, &str)] = &[("EL", "GR"), ("UK", "GB")];

/// Standard alpha-2 → Eurostat special codes (for consumers expecting Eurostat format)
pub const STANDARD_TO_EUROSTAT: &[(&str, &str)] = &[("GR", "EL"), ("GB", "UK")];

/// Keys that name a group of countries or a totals row
pub const REGIONAL_AGGREGATES: &[&str] = &[
    "EUR_OTH",
    "AFR_OTH",
    "AME_OTH",
    "ASI_OTH",
    "ASI_NME_OTH",
    "EU27_2020",
    "EA19",
    "EA20",
    "WORLD",
    "TOTAL",
    "OTH",
    "OTHER",
    "UNKNOWN",
];

/// Display names (standard alpha-2 → name)
pub const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("AL", "Albania"),
    ("AD", "Andorra"),
    ("AT", "Austria"),
    ("BE", "Belgium"),
    ("BA", "Bosnia and Herzegovina"),
    ("BG", "Bulgaria"),
    ("BY", "Belarus"),
    ("HR", "Croatia"),
    ("CY", "Cyprus"),
    ("CZ", "Czechia"),
    ("DK", "Denmark"),
    ("EE", "Estonia"),
    ("FI", "Finland"),
    ("FR", "France"),
    ("DE", "Germany"),
    ("GR", "Greece"),
    ("HU", "Hungary"),
    ("IS", "Iceland"),
    ("IE", "Ireland"),
    ("IT", "Italy"),
    ("LV", "Latvia"),
    ("LI", "Liechtenstein"),
    ("LT", "Lithuania"),
    ("LU", "Luxembourg"),
    ("MK", "North Macedonia"),
    ("MT", "Malta"),
    ("MD", "Moldova"),
    ("MC", "Monaco"),
    ("ME", "Montenegro"),
    ("NL", "Netherlands"),
    ("NO", "Norway"),
    ("PL", "Poland"),
    ("PT", "Portugal"),
    ("RO", "Romania"),
    ("RU", "Russia"),
    ("SM", "San Marino"),
    ("RS", "Serbia"),
    ("SK", "Slovakia"),
    ("SI", "Slovenia"),
    ("ES", "Spain"),
    ("SE", "Sweden"),
    ("CH", "Switzerland"),
    ("UA", "Ukraine"),
    ("GB", "United Kingdom"),
    ("VA", "Vatican City"),
    ("XK", "Kosovo"),
    ("DZ", "Algeria"),
    ("AO", "Angola"),
    ("AZ", "Azerbaijan"),
    ("AR", "Argentina"),
    ("AU", "Australia"),
    ("BH", "Bahrain"),
    ("BR", "Brazil"),
    ("BN", "Brunei"),
    ("CA", "Canada"),
    ("CN", "China"),
    ("CO", "Colombia"),
    ("CG", "Congo"),
    ("CD", "DR Congo"),
    ("EC", "Ecuador"),
    ("EG", "Egypt"),
    ("GQ", "Equatorial Guinea"),
    ("GA", "Gabon"),
    ("GE", "Georgia"),
    ("GH", "Ghana"),
    ("IN", "India"),
    ("ID", "Indonesia"),
    ("IR", "Iran"),
    ("IQ", "Iraq"),
    ("IL", "Israel"),
    ("JP", "Japan"),
    ("KZ", "Kazakhstan"),
    ("JO", "Jordan"),
    ("KW", "Kuwait"),
    ("LB", "Lebanon"),
    ("LY", "Libya"),
    ("MY", "Malaysia"),
    ("MX", "Mexico"),
    ("MA", "Morocco"),
    ("MZ", "Mozambique"),
    ("NA", "Namibia"),
    ("NG", "Nigeria"),
    ("OM", "Oman"),
    ("PK", "Pakistan"),
    ("PH", "Philippines"),
    ("QA", "Qatar"),
    ("SA", "Saudi Arabia"),
    ("SG", "Singapore"),
    ("ZA", "South Africa"),
    ("KR", "South Korea"),
    ("SD", "Sudan"),
    ("SS", "South Sudan"),
    ("SY", "Syria"),
    ("TH", "Thailand"),
    ("TT", "Trinidad and Tobago"),
    ("TN", "Tunisia"),
    ("TR", "Turkey"),
    ("TM", "Turkmenistan"),
    ("AE", "UAE"),
    ("US", "United States"),
    ("UZ", "Uzbekistan"),
    ("VE", "Venezuela"),
    ("VN", "Vietnam"),
    ("YE", "Yemen"),
    ("AF", "Afghanistan"),
    ("BD", "Bangladesh"),
    ("BT", "Bhutan"),
    ("BO", "Bolivia"),
    ("BW", "Botswana"),
    ("BZ", "Belize"),
    ("SB", "Solomon Islands"),
    ("MM", "Myanmar"),
    ("BI", "Burundi"),
    ("KH", "Cambodia"),
    ("CM", "Cameroon"),
    ("CV", "Cape Verde"),
    ("CF", "Central African Republic"),
    ("LK", "Sri Lanka"),
    ("TD", "Chad"),
    ("CL", "Chile"),
    ("TW", "Taiwan"),
    ("KM", "Comoros"),
    ("CR", "Costa Rica"),
    ("CU", "Cuba"),
    ("BJ", "Benin"),
    ("DO", "Dominican Republic"),
    ("SV", "El Salvador"),
    ("ET", "Ethiopia"),
    ("ER", "Eritrea"),
    ("FJ", "Fiji"),
    ("DJ", "Djibouti"),
    ("GM", "Gambia"),
    ("PS", "Palestine"),
    ("GI", "Gibraltar"),
    ("KI", "Kiribati"),
    ("GD", "Grenada"),
    ("GT", "Guatemala"),
    ("GN", "Guinea"),
    ("GY", "Guyana"),
    ("HT", "Haiti"),
    ("HN", "Honduras"),
    ("HK", "Hong Kong"),
    ("CI", "Ivory Coast"),
    ("JM", "Jamaica"),
    ("KE", "Kenya"),
    ("KP", "North Korea"),
    ("KG", "Kyrgyzstan"),
    ("LA", "Laos"),
    ("LS", "Lesotho"),
    ("LR", "Liberia"),
    ("MO", "Macao"),
    ("MG", "Madagascar"),
    ("MW", "Malawi"),
    ("MV", "Maldives"),
    ("ML", "Mali"),
    ("MR", "Mauritania"),
    ("MU", "Mauritius"),
    ("MN", "Mongolia"),
    ("NP", "Nepal"),
    ("NC", "New Caledonia"),
    ("VU", "Vanuatu"),
    ("NZ", "New Zealand"),
    ("NI", "Nicaragua"),
    ("NE", "Niger"),
    ("PA", "Panama"),
    ("PG", "Papua New Guinea"),
    ("PY", "Paraguay"),
    ("PE", "Peru"),
    ("RE", "Reunion"),
    ("RW", "Rwanda"),
    ("LC", "Saint Lucia"),
    ("ST", "Sao Tome and Principe"),
    ("SN", "Senegal"),
    ("SL", "Sierra Leone"),
    ("SO", "Somalia"),
    ("ZW", "Zimbabwe"),
    ("EH", "Western Sahara"),
    ("SR", "Suriname"),
    ("SZ", "Eswatini"),
    ("TJ", "Tajikistan"),
    ("TZ", "Tanzania"),
    ("TG", "Togo"),
    ("TO", "Tonga"),
    ("UG", "Uganda"),
    ("BF", "Burkina Faso"),
    ("UY", "Uruguay"),
    ("WS", "Samoa"),
    ("ZM", "Zambia"),
];

/// Spellings used by the end-use consumption source where they differ from the
/// display names of the dependency source
pub const CONSUMPTION_NAME_ALIASES: &[(&str, &str)] = &[
    ("CZ", "Czech Republic"),
    ("SK", "Slovak Republic"),
    ("TR", "Republic of Turkiye"),
    ("MD", "Republic of Moldova"),
    ("MK", "Republic of North Macedonia"),
    ("KR", "Korea"),
    ("TW", "Chinese Taipei"),
];

// ============================================================================
// RESOLVED PARTNER
// ============================================================================

/// Classification of a raw geo key before a geographic join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedPartner {
    /// Regional aggregate: must be filtered, never joined
    Aggregate { code: String },

    /// A country with a known numeric code
    Country { alpha2: String, numeric: String },

    /// Looks like a country key but has no numeric mapping
    Unmapped { code: String },
}

impl ResolvedPartner {
    pub fn is_aggregate(&self) -> bool {
        matches!(self, ResolvedPartner::Aggregate { .. })
    }

    pub fn numeric(&self) -> Option<&str> {
        match self {
            ResolvedPartner::Country { numeric, .. } => Some(numeric),
            _ => None,
        }
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

pub struct CountryCodeResolver {
    numeric_to_alpha2: HashMap<&'static str, &'static str>,
    alpha2_to_numeric: HashMap<&'static str, &'static str>,
    eurostat_to_standard: HashMap<&'static str, &'static str>,
    standard_to_eurostat: HashMap<&'static str, &'static str>,
    aggregates: HashSet<&'static str>,
    names: HashMap<&'static str, &'static str>,
    consumption_aliases: HashMap<&'static str, &'static str>,
}

static GLOBAL: Lazy<CountryCodeResolver> = Lazy::new(CountryCodeResolver::new);

impl CountryCodeResolver {
    pub fn new() -> Self {
        CountryCodeResolver {
            numeric_to_alpha2: NUMERIC_TO_ALPHA2.iter().copied().collect(),
            alpha2_to_numeric: NUMERIC_TO_ALPHA2.iter().map(|&(n, a)| (a, n)).collect(),
            eurostat_to_standard: EUROSTAT_TO_STANDARD.iter().copied().collect(),
            standard_to_eurostat: STANDARD_TO_EUROSTAT.iter().copied().collect(),
            aggregates: REGIONAL_AGGREGATES.iter().copied().collect(),
            names: COUNTRY_NAMES.iter().copied().collect(),
            consumption_aliases: CONSUMPTION_NAME_ALIASES.iter().copied().collect(),
        }
    }

    /// Shared instance (tables are immutable)
    pub fn global() -> &'static CountryCodeResolver {
        &GLOBAL
    }

    /// Uppercase, then apply the Eurostat override ("EL" → "GR", "UK" → "GB")
    ///
    /// Unmapped codes pass through uppercased.
    pub fn normalize(&self, code: &str) -> String {
        let upper = code.trim().to_uppercase();
        match self.eurostat_to_standard.get(upper.as_str()) {
            Some(standard) => standard.to_string(),
            None => upper,
        }
    }

    /// alpha-2 (standard or Eurostat) → numeric
    pub fn to_numeric(&self, alpha2: &str) -> Option<&'static str> {
        if alpha2.trim().is_empty() {
            return None;
        }
        let normalized = self.normalize(alpha2);
        self.alpha2_to_numeric.get(normalized.as_str()).copied()
    }

    /// numeric → alpha-2, left-padding the input to 3 digits ("8" → "008")
    pub fn to_alpha2(&self, numeric: &str) -> Option<&'static str> {
        let trimmed = numeric.trim();
        if trimmed.is_empty() || trimmed.len() > 3 {
            return None;
        }
        let padded = format!("{:0>3}", trimmed);
        self.numeric_to_alpha2.get(padded.as_str()).copied()
    }

    /// Case-insensitive membership in the aggregate set
    pub fn is_regional_aggregate(&self, code: &str) -> bool {
        if code.is_empty() {
            return false;
        }
        self.aggregates.contains(code.trim().to_uppercase().as_str())
    }

    /// Standard alpha-2 → Eurostat format ("GR" → "EL"); other codes pass through
    pub fn to_eurostat(&self, code: &str) -> String {
        let upper = code.trim().to_uppercase();
        match self.standard_to_eurostat.get(upper.as_str()) {
            Some(eurostat) => eurostat.to_string(),
            None => upper,
        }
    }

    /// Display name for a code in any supported alpha-2 format
    pub fn display_name(&self, code: &str) -> Option<&'static str> {
        let normalized = self.normalize(code);
        self.names.get(normalized.as_str()).copied()
    }

    /// Consumption-source spelling for a country, when it differs from the display name
    pub fn consumption_alias(&self, code: &str) -> Option<&'static str> {
        let normalized = self.normalize(code);
        self.consumption_aliases.get(normalized.as_str()).copied()
    }

    /// Classify a raw partner key for geographic joins
    pub fn resolve_partner(&self, geo: &str) -> ResolvedPartner {
        if self.is_regional_aggregate(geo) {
            return ResolvedPartner::Aggregate {
                code: geo.trim().to_uppercase(),
            };
        }

        let alpha2 = self.normalize(geo);
        match self.alpha2_to_numeric.get(alpha2.as_str()) {
            Some(numeric) => ResolvedPartner::Country {
                alpha2,
                numeric: numeric.to_string(),
            },
            None => ResolvedPartner::Unmapped { code: alpha2 },
        }
    }

    /// Number of numeric ↔ alpha-2 pairs
    pub fn mapped_count(&self) -> usize {
        self.numeric_to_alpha2.len()
    }
}

impl Default for CountryCodeResolver {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
