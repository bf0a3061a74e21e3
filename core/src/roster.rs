//! Account and territory reference data.
//!
//! The engine treats accounts as opaque: it asks a `ReferenceData` provider
//! for one and copies the fields onto the record. `StaticRoster` is the
//! built-in provider backed by curated territory, rep and company lists.
//! All selection is deterministic (same stream = same account).

use crate::rng::DealRng;
use serde::Serialize;

/// Where a deal is sold, who owns it, and to whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountRef {
    pub company:  String,
    pub industry: String,
    /// Sales region, e.g. "DACH".
    pub region:   String,
    /// Top-level geography, e.g. "Europe".
    pub geo:      String,
    /// Area within the geography, e.g. "Central Europe".
    pub area:     String,
    pub owner:    String,
}

pub trait ReferenceData: Send + Sync {
    /// Pick an account. `targeted` selects a company inside the ideal
    /// customer profile.
    fn pick(&self, targeted: bool, rng: &mut DealRng) -> AccountRef;
}

struct Territory {
    geo:    &'static str,
    area:   &'static str,
    region: &'static str,
    reps:   &'static [&'static str],
}

/// Companies for one industry in one region.
type IndustryBook = (&'static str, &'static [&'static str]);

const ICP_INDUSTRIES: [&str; 2] = ["Software & Technology", "Financial Services"];

const NON_ICP_INDUSTRIES: [&str; 6] = [
    "Healthcare & Life Sciences",
    "Manufacturing & Industrial",
    "Retail & E-commerce",
    "Professional Services",
    "Education & Government",
    "Media & Entertainment",
];

/// Curated territories. Four draws per account: territory, rep,
/// industry, company.
pub struct StaticRoster {
    territories: &'static [Territory],
}

impl StaticRoster {
    pub fn standard() -> Self {
        Self { territories: TERRITORIES }
    }

    fn companies(region: &str, industry: &str, targeted: bool) -> &'static [&'static str] {
        let table: &'static [(&'static str, &'static [IndustryBook])] = if targeted { ICP_COMPANIES } else { NON_ICP_COMPANIES };
        table
            .iter()
            .find(|(r, _)| *r == region)
            .and_then(|(_, books)| books.iter().find(|(i, _)| *i == industry))
            .map(|(_, companies)| *companies)
            .unwrap_or_else(|| Self::generic_companies(industry))
    }

    fn generic_companies(industry: &str) -> &'static [&'static str] {
        match industry {
            "Software & Technology"      => &["Generic Tech Corp"],
            "Financial Services"         => &["Generic Finance Corp"],
            "Healthcare & Life Sciences" => &["Generic MedTech Corp"],
            "Manufacturing & Industrial" => &["Generic Manufacturing Ltd"],
            "Retail & E-commerce"        => &["Generic Retail Tech"],
            "Professional Services"      => &["Generic Consulting Corp"],
            "Education & Government"     => &["Generic EduTech Ltd"],
            _                            => &["Generic Media Corp"],
        }
    }
}

fn choose<'a>(items: &[&'a str], fallback: &'a str, rng: &mut DealRng) -> &'a str {
    rng.pick(items).copied().unwrap_or(fallback)
}

impl ReferenceData for StaticRoster {
    fn pick(&self, targeted: bool, rng: &mut DealRng) -> AccountRef {
        let idx = rng.next_u64_below(self.territories.len().max(1) as u64) as usize;
        let (geo, area, region, reps) = match self.territories.get(idx) {
            Some(t) => (t.geo, t.area, t.region, t.reps),
            None    => ("Unassigned", "Unassigned", "Unassigned", &[][..]),
        };
        let owner = choose(reps, "Local Rep 1", rng);

        let industries: &[&str] = if targeted { &ICP_INDUSTRIES } else { &NON_ICP_INDUSTRIES };
        let industry = choose(industries, "Professional Services", rng);
        let company = choose(Self::companies(region, industry, targeted), "Generic Consulting Corp", rng);

        AccountRef {
            company:  company.to_string(),
            industry: industry.to_string(),
            region:   region.to_string(),
            geo:      geo.to_string(),
            area:     area.to_string(),
            owner:    owner.to_string(),
        }
    }
}

// ── Territories ───────────────────────────────────────────────────

static TERRITORIES: &[Territory] = &[
    // Asia Pacific
    Territory { geo: "Asia Pacific", area: "East Asia",      region: "Japan",          reps: &["Yuki Tanaka", "Hiroshi Sato", "Akiko Yamamoto", "Takeshi Nakamura"] },
    Territory { geo: "Asia Pacific", area: "East Asia",      region: "Korea",          reps: &["Min-jun Kim", "Soo-jin Lee", "Jae-ho Park", "Eun-hye Cho"] },
    Territory { geo: "Asia Pacific", area: "Oceania",        region: "Australia & NZ", reps: &["James Wilson", "Sarah Thompson", "Michael Brown", "Emma Davis"] },
    Territory { geo: "Asia Pacific", area: "South Asia",     region: "India",          reps: &["Rajesh Sharma", "Priya Patel", "Arjun Gupta", "Sneha Reddy"] },
    Territory { geo: "Asia Pacific", area: "Southeast Asia", region: "Southeast Asia", reps: &["Wei Lin Tan", "Siti Rahman", "Carlos Santos", "Maria Garcia"] },
    // Europe
    Territory { geo: "Europe", area: "Central Europe",  region: "DACH",            reps: &["Klaus Mueller", "Ingrid Weber", "Hans Fischer", "Petra Schmidt"] },
    Territory { geo: "Europe", area: "Northern Europe", region: "Nordics",         reps: &["Lars Andersson", "Astrid Nielsen", "Erik Johansson", "Maja Pedersen"] },
    Territory { geo: "Europe", area: "Southern Europe", region: "Southern Europe", reps: &["Marco Rossi", "Elena Rodriguez", "Dimitris Papadakis", "Sofia Martinez"] },
    Territory { geo: "Europe", area: "Western Europe",  region: "Benelux",         reps: &["Pieter Van Der Berg", "Marie Dubois"] },
    Territory { geo: "Europe", area: "Western Europe",  region: "France",          reps: &["Jean Dupont", "Sophie Martin", "Pierre Leclerc"] },
    Territory { geo: "Europe", area: "Western Europe",  region: "UK & Ireland",    reps: &["Oliver Johnson", "Emma Williams", "Connor O'Sullivan"] },
    // Latin America
    Territory { geo: "Latin America", area: "South America", region: "Argentina", reps: &["Carlos Mendoza"] },
    Territory { geo: "Latin America", area: "South America", region: "Brazil",    reps: &["Lucas Silva", "Ana Santos"] },
    Territory { geo: "Latin America", area: "South America", region: "Chile",     reps: &["Diego Gonzalez"] },
    Territory { geo: "Latin America", area: "South America", region: "Colombia",  reps: &["Alejandra Vargas"] },
    // North America
    Territory { geo: "North America", area: "Canada",     region: "Canada",     reps: &["Ryan MacDonald", "Jennifer Chen", "Alexandre Dubois"] },
    Territory { geo: "North America", area: "Central US", region: "US Central", reps: &["Jake Anderson", "Michelle Rodriguez", "Tyler Johnson"] },
    Territory { geo: "North America", area: "East Coast", region: "US East",    reps: &["Alex Chen", "Sarah Johnson", "Michael Thompson"] },
    Territory { geo: "North America", area: "Mexico",     region: "Mexico",     reps: &["Roberto Martinez", "Lucia Hernandez"] },
    Territory { geo: "North America", area: "West Coast", region: "US West",    reps: &["Jordan Smith", "Casey Wilson", "Taylor Brown"] },
];

// ── Companies ─────────────────────────────────────────────────────
// Regions missing from a table fall back to generic names.

static ICP_COMPANIES: &[(&str, &[IndustryBook])] = &[
    ("Japan", &[
        ("Software & Technology", &["NipponTech Solutions", "Tokyo Systems Corp", "SoftwareNinja Inc", "DataSamurai Ltd"]),
        ("Financial Services",    &["JapanFinance Corp", "Tokyo Capital Systems", "NipponBank Tech", "Samurai Trading Inc"]),
    ]),
    ("Korea", &[
        ("Software & Technology", &["KoreaTech Dynamics", "Seoul Software Corp", "HanTech Solutions", "K-Innovation Inc"]),
        ("Financial Services",    &["Korea Financial Tech", "Seoul Capital Corp", "Hanbok Investment Systems", "K-Finance Solutions"]),
    ]),
    ("Australia & NZ", &[
        ("Software & Technology", &["Aussie Tech Solutions", "Sydney Software Corp", "Kiwi Innovation Ltd", "OzTech Dynamics"]),
        ("Financial Services",    &["Australia Finance Corp", "Sydney Capital Systems", "ANZ Investment Tech", "Outback Financial Inc"]),
    ]),
    ("India", &[
        ("Software & Technology", &["Bangalore Tech Corp", "Mumbai Software Solutions", "Delhi Innovation Systems", "TechGanga Ltd"]),
        ("Financial Services",    &["India FinTech Corp", "Mumbai Capital Solutions", "Bangalore Investment Systems", "Digital Rupee Inc"]),
    ]),
    ("Southeast Asia", &[
        ("Software & Technology", &["ASEAN Tech Solutions", "Singapore Software Corp", "Bangkok Innovation Ltd", "SEA Tech Dynamics"]),
        ("Financial Services",    &["Singapore Finance Corp", "ASEAN Capital Systems", "Thai Investment Tech", "SEA Financial Solutions"]),
    ]),
    ("DACH", &[
        ("Software & Technology", &["Deutsche Tech Corp", "Alpine Software Solutions", "Swiss Innovation Systems", "Germanic Tech Ltd"]),
        ("Financial Services",    &["Deutsche Bank Tech", "Swiss Capital Corp", "Austrian Investment Systems", "DACH Financial Solutions"]),
    ]),
    ("Nordics", &[
        ("Software & Technology", &["Nordic Tech Solutions", "Stockholm Software Corp", "Viking Innovation Ltd", "Scandinavian Tech Inc"]),
        ("Financial Services",    &["Nordic Finance Corp", "Stockholm Capital Systems", "Viking Investment Tech", "Scandinavian Financial Ltd"]),
    ]),
    ("Southern Europe", &[
        ("Software & Technology", &["Mediterranean Tech Corp", "Iberian Software Solutions", "Italian Innovation Systems", "Hellenic Tech Ltd"]),
        ("Financial Services",    &["Mediterranean Finance Corp", "Iberian Capital Systems", "Italian Investment Tech", "Greek Financial Solutions"]),
    ]),
    ("Benelux", &[
        ("Software & Technology", &["Benelux Tech Solutions", "Amsterdam Software Corp"]),
        ("Financial Services",    &["Dutch Finance Corp", "Belgian Capital Systems"]),
    ]),
    ("France", &[
        ("Software & Technology", &["French Tech Solutions", "Paris Software Corp", "Gallic Innovation Systems"]),
        ("Financial Services",    &["French Finance Corp", "Paris Capital Systems", "Gallic Investment Tech"]),
    ]),
    ("UK & Ireland", &[
        ("Software & Technology", &["British Tech Solutions", "London Software Corp", "Celtic Innovation Ltd"]),
        ("Financial Services",    &["UK Finance Corp", "London Capital Systems", "Irish Investment Tech"]),
    ]),
    ("Argentina", &[
        ("Software & Technology", &["Argentine Tech Solutions"]),
        ("Financial Services",    &["Buenos Aires Finance Corp"]),
    ]),
    ("Brazil", &[
        ("Software & Technology", &["Brazilian Tech Corp", "São Paulo Software Solutions"]),
        ("Financial Services",    &["Brazilian Finance Corp", "São Paulo Capital Systems"]),
    ]),
    ("Chile", &[
        ("Software & Technology", &["Chilean Tech Solutions"]),
        ("Financial Services",    &["Santiago Finance Corp"]),
    ]),
    ("Colombia", &[
        ("Software & Technology", &["Colombian Tech Solutions"]),
        ("Financial Services",    &["Bogotá Finance Corp"]),
    ]),
    ("Canada", &[
        ("Software & Technology", &["Canadian Tech Solutions", "Toronto Software Corp", "Maple Innovation Systems"]),
        ("Financial Services",    &["Canadian Finance Corp", "Toronto Capital Systems", "Maple Investment Tech"]),
    ]),
    ("US Central", &[
        ("Software & Technology", &["Midwest Tech Solutions", "Chicago Software Corp", "Heartland Innovation Systems"]),
        ("Financial Services",    &["Midwest Finance Corp", "Chicago Capital Systems", "Central Investment Tech"]),
    ]),
    ("US East", &[
        ("Software & Technology", &["East Coast Tech Solutions", "New York Software Corp", "Atlantic Innovation Systems"]),
        ("Financial Services",    &["Wall Street Finance Corp", "NYC Capital Systems", "Eastern Investment Tech"]),
    ]),
    ("Mexico", &[
        ("Software & Technology", &["Mexican Tech Solutions", "Mexico City Software Corp"]),
        ("Financial Services",    &["Mexican Finance Corp", "Mexico City Capital Systems"]),
    ]),
    ("US West", &[
        ("Software & Technology", &["West Coast Tech Solutions", "Silicon Valley Software Corp", "Pacific Innovation Systems"]),
        ("Financial Services",    &["West Coast Finance Corp", "SF Capital Systems", "Pacific Investment Tech"]),
    ]),
];

static NON_ICP_COMPANIES: &[(&str, &[IndustryBook])] = &[
    ("Japan", &[
        ("Healthcare & Life Sciences", &["Japan MedTech Corp", "Tokyo Health Systems"]),
        ("Manufacturing & Industrial", &["Nippon Manufacturing Ltd", "Tokyo Industrial Corp"]),
        ("Retail & E-commerce",        &["Japan Retail Tech", "Tokyo Shopping Systems"]),
        ("Professional Services",      &["Japan Consulting Corp", "Tokyo Professional Services"]),
        ("Education & Government",     &["Japan EduTech Ltd", "Tokyo Gov Systems"]),
        ("Media & Entertainment",      &["Japan Media Corp", "Tokyo Entertainment Tech"]),
    ]),
    ("Korea", &[
        ("Healthcare & Life Sciences", &["Korea MedTech Corp", "Seoul Health Systems"]),
        ("Manufacturing & Industrial", &["Korea Manufacturing Ltd", "Seoul Industrial Corp"]),
        ("Retail & E-commerce",        &["Korea Retail Tech", "Seoul Shopping Systems"]),
        ("Professional Services",      &["Korea Consulting Corp", "Seoul Professional Services"]),
        ("Education & Government",     &["Korea EduTech Ltd", "Seoul Gov Systems"]),
        ("Media & Entertainment",      &["Korea Media Corp", "Seoul Entertainment Tech"]),
    ]),
    ("US East", &[
        ("Healthcare & Life Sciences", &["East Coast MedTech Corp", "NYC Health Systems"]),
        ("Manufacturing & Industrial", &["East Coast Manufacturing Ltd", "NYC Industrial Corp"]),
        ("Retail & E-commerce",        &["East Coast Retail Tech", "NYC Shopping Systems"]),
        ("Professional Services",      &["East Coast Consulting Corp", "NYC Professional Services"]),
        ("Education & Government",     &["East Coast EduTech Ltd", "NYC Gov Systems"]),
        ("Media & Entertainment",      &["East Coast Media Corp", "NYC Entertainment Tech"]),
    ]),
    ("US West", &[
        ("Healthcare & Life Sciences", &["West Coast MedTech Corp", "SF Health Systems"]),
        ("Manufacturing & Industrial", &["West Coast Manufacturing Ltd", "SF Industrial Corp"]),
        ("Retail & E-commerce",        &["West Coast Retail Tech", "SF Shopping Systems"]),
        ("Professional Services",      &["West Coast Consulting Corp", "SF Professional Services"]),
        ("Education & Government",     &["West Coast EduTech Ltd", "SF Gov Systems"]),
        ("Media & Entertainment",      &["West Coast Media Corp", "SF Entertainment Tech"]),
    ]),
];
