//! Display-name translation for record keys.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat `source key -> display key` dictionary. Unmapped keys keep their name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyMap(IndexMap<String, String>);

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Display name for `key`, or `key` itself when unmapped.
    pub fn label<'a>(&'a self, key: &'a str) -> &'a str {
        self.0.get(key).map(String::as_str).unwrap_or(key)
    }

    /// Overlay `other` on top of this map; its entries win.
    pub fn merged(mut self, other: &KeyMap) -> Self {
        for (key, label) in &other.0 {
            self.0.insert(key.clone(), label.clone());
        }
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, label)| (key.into(), label.into()))
                .collect(),
        )
    }
}

/// Rename every mapping key in `data` through `key_map`.
///
/// Structure, order and non-key values are preserved. If two keys of one
/// mapping translate to the same label, the later value replaces the earlier
/// one in the earlier position.
pub fn translate(data: Value, key_map: &KeyMap) -> Value {
    match data {
        Value::Object(map) => {
            let mut renamed = Map::new();
            for (key, value) in map {
                let label = key_map.label(&key).to_string();
                renamed.insert(label, translate(value, key_map));
            }
            Value::Object(renamed)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| translate(item, key_map))
                .collect(),
        ),
        scalar => scalar,
    }
}

/// Built-in English -> Chinese labels for the upstream almanac fields.
pub fn default_key_map() -> KeyMap {
    [
        // sections
        ("data", "data"),
        ("bottom", "额外补充"),
        ("ganZhi", "干支"),
        ("info", "基本信息"),
        ("lunar", "农历"),
        ("solar", "公历"),
        ("yiJi", "宜忌"),
        ("positions", "吉神方位"),
        ("zodiac", "生肖"),
        ("hours", "时辰吉凶"),
        // suit / avoid
        ("yi", "宜"),
        ("ji", "忌"),
        // gods and luck
        ("jiShen", "吉神宜趋"),
        ("xiongSha", "凶煞宜忌"),
        ("tianShen", "值神"),
        ("taiShen", "今日胎神"),
        // astrology
        ("liuYao", "六曜"),
        ("xiu", "二十八星宿"),
        ("xiuLuck", "星宿吉凶"),
        ("yueXiang", "月相"),
        ("zhiXing", "建除十二神"),
        ("xingZuo", "星座"),
        // positions
        ("cai", "财神"),
        ("xi", "喜神"),
        ("fu", "福神"),
        ("yangGui", "阳贵神"),
        ("yinGui", "阴贵神"),
        ("dayTai", "逐日胎神"),
        ("monthTai", "逐月胎神"),
        ("yearTai", "逐年胎神"),
        // clash
        ("chongDesc", "冲煞"),
        ("chongShengXiao", "冲生肖"),
        ("sha", "煞方"),
        ("luck", "吉凶"),
        // dates and time
        ("year", "年"),
        ("month", "月"),
        ("day", "日"),
        ("time", "时"),
        ("weekInChinese", "星期"),
        ("dayInChinese", "农历日"),
        ("monthInChinese", "农历月"),
        // na yin
        ("yearNaYin", "年纳音"),
        ("monthNaYin", "月纳音"),
        ("dayNaYin", "日纳音"),
        // pillars
        ("timeZhi", "时支"),
        ("zhi", "地支"),
    ]
    .into_iter()
    .collect()
}
