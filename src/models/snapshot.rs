use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

use crate::errors::Result;

/// 一次抓取得到的完整历史数据快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// 数据更新标签，例如 "2025-April"，不参与任何计算
    #[serde(
        rename = "asOfLabel",
        alias = "year_month",
        alias = "as_of_label",
        default,
        deserialize_with = "null_as_default"
    )]
    pub as_of_label: String,

    #[serde(
        rename = "availableMonths",
        alias = "key_list",
        alias = "available_months",
        default,
        deserialize_with = "null_as_default"
    )]
    pub available_months: Vec<String>,

    /// 日期字符串 -> 当日记录，保持输入顺序
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: DatedRecords,
}

impl Snapshot {
    /// 空快照，表示 "暂无数据"
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 按输入顺序遍历 (日期, 记录)
    pub fn records(&self) -> impl Iterator<Item = (&str, &DailyRecord)> {
        self.data.iter()
    }

    pub fn insert(&mut self, date: &str, record: DailyRecord) {
        self.data.insert(date, record);
    }
}

/// 按输入顺序保存的 (日期字符串, 记录) 列表，JSON 中为对象。
///
/// 不同写法的日期可能落在同一天，表构建时以后出现的为准，
/// 所以这里不能按 key 排序。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatedRecords(Vec<(String, DailyRecord)>);

impl DatedRecords {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DailyRecord)> {
        self.0.iter().map(|(date, record)| (date.as_str(), record))
    }

    pub fn get(&self, date: &str) -> Option<&DailyRecord> {
        self.0.iter().find(|(key, _)| key == date).map(|(_, record)| record)
    }

    /// 相同 key 原位替换，否则追加到末尾
    pub fn insert(&mut self, date: &str, record: DailyRecord) {
        match self.0.iter_mut().find(|(key, _)| key == date) {
            Some(entry) => entry.1 = record,
            None => self.0.push((date.to_string(), record)),
        }
    }
}

impl Serialize for DatedRecords {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (date, record) in &self.0 {
            map.serialize_entry(date, record)?;
        }
        map.end()
    }
}

struct DatedRecordsVisitor;

impl<'de> Visitor<'de> for DatedRecordsVisitor {
    type Value = DatedRecords;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object of date -> daily record")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut records = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((date, record)) = access.next_entry::<String, DailyRecord>()? {
            records.push((date, record));
        }
        Ok(DatedRecords(records))
    }
}

impl<'de> Deserialize<'de> for DatedRecords {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(DatedRecordsVisitor)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 单日的嵌套记录。
///
/// 任意层级的任意 key 都可能缺失，这里保留原始 JSON 对象，
/// 由规范化器按字段表逐项读取。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DailyRecord(Map<String, Value>);

impl DailyRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// 仅接受 JSON 对象，其他类型返回 None
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            Value::Null => Some(Self::default()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// 沿路径逐层查找对象节点，任一层缺失或不是对象时返回 None。
    /// 空路径返回记录本身。
    pub fn branch(&self, path: &[&str]) -> Option<&Map<String, Value>> {
        let mut node = &self.0;
        for key in path {
            node = find_key(node, key)?.as_object()?;
        }
        Some(node)
    }

    /// 按完整路径查找叶子值，null 视为缺失
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        let (leaf, branch) = path.split_last()?;
        find_key(self.branch(branch)?, leaf).filter(|value| !value.is_null())
    }
}

impl<'de> Deserialize<'de> for DailyRecord {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        DailyRecord::from_value(value)
            .ok_or_else(|| serde::de::Error::custom("daily record must be a JSON object"))
    }
}

/// key 的规范形式：忽略大小写以及 `_` / `-`，
/// 使 `buy_sell_difference`、`buySellDifference`、`quantity-wise` 等写法对应同一字段
pub(crate) fn canonical_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// 先精确匹配，再按规范形式匹配
pub(crate) fn find_key<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if let Some(value) = map.get(key) {
        return Some(value);
    }
    let wanted = canonical_key(key);
    map.iter()
        .find(|(candidate, _)| canonical_key(candidate) == wanted)
        .map(|(_, value)| value)
}

/// 参与者类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Participant {
    Fii,
    Dii,
}

impl Participant {
    pub const ALL: [Participant; 2] = [Participant::Fii, Participant::Dii];

    /// 列名前缀
    pub fn prefix(&self) -> &'static str {
        match self {
            Participant::Fii => "fii",
            Participant::Dii => "dii",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Participant::Fii => "FII",
            Participant::Dii => "DII",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match canonical_key(s).as_str() {
            "fii" => Some(Participant::Fii),
            "dii" => Some(Participant::Dii),
            _ => None,
        }
    }
}
