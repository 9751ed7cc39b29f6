use serde::Serialize;
use std::{fmt, str::FromStr};

use crate::error::AtlasError;

/// Coarse grouping used by the region tabs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Region {
    Asia,
    Africa,
    Europe,
    AmericasOceania,
}

impl Region {
    /// Tab order
    pub const ALL: [Region; 4] = [
        Region::Asia,
        Region::Africa,
        Region::Europe,
        Region::AmericasOceania,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Region::Asia => "亚洲",
            Region::Africa => "非洲",
            Region::Europe => "欧洲",
            Region::AmericasOceania => "美洲与大洋洲",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Region {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        if let Some(r) = Region::ALL.into_iter().find(|r| r.label() == key) {
            return Ok(r);
        }
        match key.to_lowercase().as_str() {
            "asia" => Ok(Region::Asia),
            "africa" => Ok(Region::Africa),
            "europe" => Ok(Region::Europe),
            "americas-oceania" | "americas_oceania" | "americas" | "oceania" => {
                Ok(Region::AmericasOceania)
            }
            _ => Err(AtlasError::UnknownRegion(s.to_string())),
        }
    }
}

/// Entry regime for the passport at a destination
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum VisaCategory {
    MutualFree,
    VisaFree,
    VisaOnArrival,
    ElectronicAuthorization,
    Other,
}

impl VisaCategory {
    pub const ALL: [VisaCategory; 5] = [
        VisaCategory::MutualFree,
        VisaCategory::VisaFree,
        VisaCategory::VisaOnArrival,
        VisaCategory::ElectronicAuthorization,
        VisaCategory::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            VisaCategory::MutualFree => "互免签证",
            VisaCategory::VisaFree => "免签",
            VisaCategory::VisaOnArrival => "落地签 (VOA)",
            VisaCategory::ElectronicAuthorization => "电子旅行许可/电子签",
            VisaCategory::Other => "其他",
        }
    }

    /// Mutual or unilateral visa-free
    pub fn is_visa_free(self) -> bool {
        matches!(self, VisaCategory::MutualFree | VisaCategory::VisaFree)
    }
}

impl fmt::Display for VisaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VisaCategory {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        if let Some(c) = VisaCategory::ALL.into_iter().find(|c| c.label() == key) {
            return Ok(c);
        }
        match key.to_lowercase().as_str() {
            "mutual" | "mutual-free" => Ok(VisaCategory::MutualFree),
            "free" | "visa-free" => Ok(VisaCategory::VisaFree),
            "voa" | "visa-on-arrival" => Ok(VisaCategory::VisaOnArrival),
            "eta" | "evisa" => Ok(VisaCategory::ElectronicAuthorization),
            "other" => Ok(VisaCategory::Other),
            _ => Err(AtlasError::UnknownCategory(s.to_string())),
        }
    }
}

/// One destination. The whole table is compiled in and never changes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CountryRecord {
    pub id: &'static str,
    pub name: &'static str,
    pub glyph: &'static str,
    pub region: Region,
    pub category: VisaCategory,
    pub days: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
    /// (longitude, latitude) in degrees
    pub position: (f64, f64),
}

/// Lookup by id; linear, the table is tiny
#[cfg(test)]
pub fn find(id: &str) -> Option<&'static CountryRecord> {
    COUNTRIES.iter().find(|c| c.id == id)
}

/// 2025 policy table for the PRC passport, in display order
pub static COUNTRIES: &[CountryRecord] = &[
    // Asia
    CountryRecord {
        id: "THA",
        name: "泰国",
        glyph: "🇹🇭",
        region: Region::Asia,
        category: VisaCategory::MutualFree,
        days: "30 天",
        cost: None,
        note: Some("永久互免，每180天累计不超过90天"),
        position: (100.9925, 15.8700),
    },
    CountryRecord {
        id: "SGP",
        name: "新加坡",
        glyph: "🇸🇬",
        region: Region::Asia,
        category: VisaCategory::MutualFree,
        days: "30 天",
        cost: None,
        note: Some("入境前需填写电子入境卡 (SG Arrival Card)"),
        position: (103.8198, 1.3521),
    },
    CountryRecord {
        id: "MYS",
        name: "马来西亚",
        glyph: "🇲🇾",
        region: Region::Asia,
        category: VisaCategory::VisaFree,
        days: "30 天",
        cost: None,
        note: Some("需提前填写数字入境卡 (MDAC)"),
        position: (101.9758, 4.2105),
    },
    CountryRecord {
        id: "KAZ",
        name: "哈萨克斯坦",
        glyph: "🇰🇿",
        region: Region::Asia,
        category: VisaCategory::MutualFree,
        days: "30 天",
        cost: None,
        note: Some("每180天累计不超过90天"),
        position: (66.9237, 48.0196),
    },
    CountryRecord {
        id: "ARE",
        name: "阿联酋",
        glyph: "🇦🇪",
        region: Region::Asia,
        category: VisaCategory::MutualFree,
        days: "30 天",
        cost: None,
        note: Some("免费，可付费延期"),
        position: (53.8478, 23.4241),
    },
    CountryRecord {
        id: "QAT",
        name: "卡塔尔",
        glyph: "🇶🇦",
        region: Region::Asia,
        category: VisaCategory::MutualFree,
        days: "30 天",
        cost: None,
        note: Some("免费"),
        position: (51.1839, 25.3548),
    },
    CountryRecord {
        id: "GEO",
        name: "格鲁吉亚",
        glyph: "🇬🇪",
        region: Region::Asia,
        category: VisaCategory::VisaFree,
        days: "30 天",
        cost: None,
        note: Some("每180天累计不超过90天"),
        position: (43.3569, 42.3154),
    },
    CountryRecord {
        id: "UZB",
        name: "乌兹别克斯坦",
        glyph: "🇺🇿",
        region: Region::Asia,
        category: VisaCategory::VisaFree,
        days: "30 天",
        cost: None,
        note: Some("2025年新政"),
        position: (64.5853, 41.3775),
    },
    CountryRecord {
        id: "IRN",
        name: "伊朗",
        glyph: "🇮🇷",
        region: Region::Asia,
        category: VisaCategory::VisaFree,
        days: "21 天",
        cost: None,
        note: Some("单方面免签"),
        position: (53.6880, 32.4279),
    },
    CountryRecord {
        id: "KOR_JEJU",
        name: "济州岛 (韩国)",
        glyph: "🇰🇷",
        region: Region::Asia,
        category: VisaCategory::VisaFree,
        days: "30 天",
        cost: None,
        note: Some("仅限济州岛，不能进入韩国本土"),
        position: (126.5312, 33.4996),
    },
    CountryRecord {
        id: "IDN",
        name: "印度尼西亚",
        glyph: "🇮🇩",
        region: Region::Asia,
        category: VisaCategory::VisaOnArrival,
        days: "30 天",
        cost: Some("约 $35"),
        note: Some("可延期一次"),
        position: (113.9213, -0.7893),
    },
    CountryRecord {
        id: "LAO",
        name: "老挝",
        glyph: "🇱🇦",
        region: Region::Asia,
        category: VisaCategory::VisaOnArrival,
        days: "30 天",
        cost: Some("$20-40"),
        note: None,
        position: (102.4955, 19.8563),
    },
    CountryRecord {
        id: "KHM",
        name: "柬埔寨",
        glyph: "🇰🇭",
        region: Region::Asia,
        category: VisaCategory::VisaOnArrival,
        days: "30 天",
        cost: Some("约 $30"),
        note: Some("推荐电子签 (E-visa)"),
        position: (104.9910, 12.5657),
    },
    CountryRecord {
        id: "NPL",
        name: "尼泊尔",
        glyph: "🇳🇵",
        region: Region::Asia,
        category: VisaCategory::VisaOnArrival,
        days: "15-90 天",
        cost: Some("免费"),
        note: Some("Gratis Visa (免签证费)"),
        position: (84.1240, 28.3949),
    },
    CountryRecord {
        id: "LKA",
        name: "斯里兰卡",
        glyph: "🇱🇰",
        region: Region::Asia,
        category: VisaCategory::VisaFree,
        days: "30 天",
        cost: None,
        note: Some("试行免签证费，需提前ETA或落地办"),
        position: (80.7718, 7.8731),
    },
    CountryRecord {
        id: "MDV",
        name: "马尔代夫",
        glyph: "🇲🇻",
        region: Region::Asia,
        category: VisaCategory::VisaFree,
        days: "30 天",
        cost: None,
        note: Some("免费落地视同免签"),
        position: (73.2207, 3.2028),
    },
    CountryRecord {
        id: "BHR",
        name: "巴林",
        glyph: "🇧🇭",
        region: Region::Asia,
        category: VisaCategory::VisaOnArrival,
        days: "14/30 天",
        cost: Some("$15-70"),
        note: None,
        position: (50.5577, 26.0667),
    },
    CountryRecord {
        id: "JOR",
        name: "约旦",
        glyph: "🇯🇴",
        region: Region::Asia,
        category: VisaCategory::VisaOnArrival,
        days: "30 天",
        cost: Some("约 $56"),
        note: Some("持 Jordan Pass 可免签证费"),
        position: (36.2384, 30.5852),
    },
    CountryRecord {
        id: "VNM",
        name: "越南",
        glyph: "🇻🇳",
        region: Region::Asia,
        category: VisaCategory::ElectronicAuthorization,
        days: "30-90 天",
        cost: Some("约 $25"),
        note: Some("推荐电子签，落地签需批文"),
        position: (108.2772, 14.0583),
    },

    // Africa
    CountryRecord {
        id: "MAR",
        name: "摩洛哥",
        glyph: "🇲🇦",
        region: Region::Africa,
        category: VisaCategory::VisaFree,
        days: "90 天",
        cost: None,
        note: None,
        position: (-7.0926, 31.7917),
    },
    CountryRecord {
        id: "TUN",
        name: "突尼斯",
        glyph: "🇹🇳",
        region: Region::Africa,
        category: VisaCategory::VisaFree,
        days: "90 天",
        cost: None,
        note: Some("需出示酒店预订单和往返机票"),
        position: (9.5375, 33.8869),
    },
    CountryRecord {
        id: "MUS",
        name: "毛里求斯",
        glyph: "🇲🇺",
        region: Region::Africa,
        category: VisaCategory::MutualFree,
        days: "60 天",
        cost: None,
        note: None,
        position: (57.5522, -20.3484),
    },
    CountryRecord {
        id: "SYC",
        name: "塞舌尔",
        glyph: "🇸🇨",
        region: Region::Africa,
        category: VisaCategory::MutualFree,
        days: "30 天",
        cost: None,
        note: None,
        position: (55.4920, -4.6796),
    },
    CountryRecord {
        id: "EGY",
        name: "埃及",
        glyph: "🇪🇬",
        region: Region::Africa,
        category: VisaCategory::VisaOnArrival,
        days: "30 天",
        cost: Some("约 $25"),
        note: Some("需携带$2000现金或等值货币备查"),
        position: (30.8025, 26.8206),
    },
    CountryRecord {
        id: "TZA",
        name: "坦桑尼亚",
        glyph: "🇹🇿",
        region: Region::Africa,
        category: VisaCategory::VisaOnArrival,
        days: "90 天",
        cost: Some("约 $50"),
        note: None,
        position: (34.8888, -6.3690),
    },
    CountryRecord {
        id: "KEN",
        name: "肯尼亚",
        glyph: "🇰🇪",
        region: Region::Africa,
        category: VisaCategory::ElectronicAuthorization,
        days: "90 天",
        cost: Some("约 $30"),
        note: Some("需申请 eTA"),
        position: (37.9062, -0.0236),
    },
    CountryRecord {
        id: "MDG",
        name: "马达加斯加",
        glyph: "🇲🇬",
        region: Region::Africa,
        category: VisaCategory::VisaOnArrival,
        days: "15-60 天",
        cost: Some("€0-35"),
        note: None,
        position: (46.8691, -18.7669),
    },
    CountryRecord {
        id: "AGO",
        name: "安哥拉",
        glyph: "🇦🇴",
        region: Region::Africa,
        category: VisaCategory::VisaFree,
        days: "30 天",
        cost: None,
        note: Some("需往返机票和酒店订单"),
        position: (17.8739, -11.2027),
    },
    CountryRecord {
        id: "MOZ",
        name: "莫桑比克",
        glyph: "🇲🇿",
        region: Region::Africa,
        category: VisaCategory::VisaFree,
        days: "30 天",
        cost: Some("约 $10 手续费"),
        note: None,
        position: (35.5296, -18.6657),
    },

    // Europe
    CountryRecord {
        id: "SRB",
        name: "塞尔维亚",
        glyph: "🇷🇸",
        region: Region::Europe,
        category: VisaCategory::MutualFree,
        days: "30 天",
        cost: None,
        note: None,
        position: (21.0059, 44.0165),
    },
    CountryRecord {
        id: "BIH",
        name: "波黑",
        glyph: "🇧🇦",
        region: Region::Europe,
        category: VisaCategory::MutualFree,
        days: "30 天",
        cost: None,
        note: Some("每60天内累计停留30天"),
        position: (17.6791, 43.9159),
    },
    CountryRecord {
        id: "ARM",
        name: "亚美尼亚",
        glyph: "🇦🇲",
        region: Region::Europe,
        category: VisaCategory::MutualFree,
        days: "90 天",
        cost: None,
        note: Some("每180天累计不超过90天"),
        position: (45.0382, 40.0691),
    },
    CountryRecord {
        id: "BLR",
        name: "白俄罗斯",
        glyph: "🇧🇾",
        region: Region::Europe,
        category: VisaCategory::MutualFree,
        days: "30 天",
        cost: None,
        note: Some("一年内累计不超过90天"),
        position: (27.9534, 53.7098),
    },
    CountryRecord {
        id: "ALB",
        name: "阿尔巴尼亚",
        glyph: "🇦🇱",
        region: Region::Europe,
        category: VisaCategory::VisaFree,
        days: "90 天",
        cost: None,
        note: None,
        position: (20.1683, 41.1533),
    },
    CountryRecord {
        id: "SMR",
        name: "圣马力诺",
        glyph: "🇸🇲",
        region: Region::Europe,
        category: VisaCategory::MutualFree,
        days: "90 天",
        cost: None,
        note: Some("需申根签证经意大利入境"),
        position: (12.4578, 43.9424),
    },

    // Americas & Oceania
    CountryRecord {
        id: "BRB",
        name: "巴巴多斯",
        glyph: "🇧🇧",
        region: Region::AmericasOceania,
        category: VisaCategory::MutualFree,
        days: "30 天",
        cost: None,
        note: None,
        position: (-59.5432, 13.1939),
    },
    CountryRecord {
        id: "BHS",
        name: "巴哈马",
        glyph: "🇧🇸",
        region: Region::AmericasOceania,
        category: VisaCategory::MutualFree,
        days: "30 天",
        cost: None,
        note: Some("通常需从美国转机"),
        position: (-77.3963, 25.0343),
    },
    CountryRecord {
        id: "ECU",
        name: "厄瓜多尔",
        glyph: "🇪🇨",
        region: Region::AmericasOceania,
        category: VisaCategory::MutualFree,
        days: "90 天",
        cost: None,
        note: Some("一年内累计不超过90天"),
        position: (-78.1834, -1.8312),
    },
    CountryRecord {
        id: "DMA",
        name: "多米尼克",
        glyph: "🇩🇲",
        region: Region::AmericasOceania,
        category: VisaCategory::MutualFree,
        days: "21 天",
        cost: None,
        note: None,
        position: (-61.3710, 15.4150),
    },
    CountryRecord {
        id: "CUB",
        name: "古巴",
        glyph: "🇨🇺",
        region: Region::AmericasOceania,
        category: VisaCategory::VisaFree,
        days: "90 天",
        cost: None,
        note: Some("需持有效护照"),
        position: (-77.7812, 21.5218),
    },
    CountryRecord {
        id: "FJI",
        name: "斐济",
        glyph: "🇫🇯",
        region: Region::AmericasOceania,
        category: VisaCategory::MutualFree,
        days: "30 天",
        cost: None,
        note: None,
        position: (178.0650, -17.7134),
    },
    CountryRecord {
        id: "TON",
        name: "汤加",
        glyph: "🇹🇴",
        region: Region::AmericasOceania,
        category: VisaCategory::MutualFree,
        days: "30 天",
        cost: None,
        note: None,
        position: (-175.1982, -21.1790),
    },
    CountryRecord {
        id: "WSM",
        name: "萨摩亚",
        glyph: "🇼🇸",
        region: Region::AmericasOceania,
        category: VisaCategory::VisaFree,
        days: "60 天",
        cost: None,
        note: None,
        position: (-172.1046, -13.7590),
    },
    CountryRecord {
        id: "KIR",
        name: "基里巴斯",
        glyph: "🇰🇮",
        region: Region::AmericasOceania,
        category: VisaCategory::VisaFree,
        days: "30 天",
        cost: None,
        note: None,
        position: (-157.3661, 1.8709),
    },
    CountryRecord {
        id: "MNP",
        name: "塞班岛 (美属)",
        glyph: "🇲🇵",
        region: Region::AmericasOceania,
        category: VisaCategory::VisaFree,
        days: "45 天",
        cost: None,
        note: Some("需填写 CNMI 申请表"),
        position: (145.6739, 15.0979),
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = COUNTRIES.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), COUNTRIES.len());
    }

    #[test]
    fn table_has_expected_shape() {
        assert_eq!(COUNTRIES.len(), 45);
        let count = |r: Region| COUNTRIES.iter().filter(|c| c.region == r).count();
        assert_eq!(count(Region::Asia), 19);
        assert_eq!(count(Region::Africa), 10);
        assert_eq!(count(Region::Europe), 6);
        assert_eq!(count(Region::AmericasOceania), 10);
    }

    #[test]
    fn positions_are_valid_degrees() {
        for c in COUNTRIES {
            let (lon, lat) = c.position;
            assert!((-180.0..=180.0).contains(&lon), "{} lon {}", c.id, lon);
            assert!((-90.0..=90.0).contains(&lat), "{} lat {}", c.id, lat);
        }
    }

    #[test]
    fn regions_parse_from_label_and_alias() {
        assert_eq!("亚洲".parse::<Region>().unwrap(), Region::Asia);
        assert_eq!("Europe".parse::<Region>().unwrap(), Region::Europe);
        assert_eq!("oceania".parse::<Region>().unwrap(), Region::AmericasOceania);
        assert!("atlantis".parse::<Region>().is_err());
    }

    #[test]
    fn categories_parse_from_label_and_alias() {
        assert_eq!("落地签 (VOA)".parse::<VisaCategory>().unwrap(), VisaCategory::VisaOnArrival);
        assert_eq!("eta".parse::<VisaCategory>().unwrap(), VisaCategory::ElectronicAuthorization);
        assert!("tourist".parse::<VisaCategory>().is_err());
    }

    #[test]
    fn find_by_id() {
        assert_eq!(find("KOR_JEJU").map(|c| c.name), Some("济州岛 (韩国)"));
        assert!(find("XXX").is_none());
    }
}
