use serde::{Deserialize, Serialize};

use super::entity_type::BusinessIndicator;

/// 注册处的一条记录
///
/// 只由外部数据源产生，构造之后不再修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryRecord {
    pub entity_number: String,
    pub name: String,
    pub status_description: String,
    pub entity_type_description: String,
    /// 地址行，空行已过滤
    pub address_lines: Vec<String>,
    pub place_of_business: String,
    pub postal_code: String,
    /// 抓取页面时无法得知类型，此时为 None
    pub business_indicator: Option<BusinessIndicator>,
}

impl RegistryRecord {
    /// 抓取策略只能拿到名称
    pub fn name_only(entity_number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            entity_number: entity_number.into(),
            name: name.into(),
            status_description: String::new(),
            entity_type_description: String::new(),
            address_lines: Vec::new(),
            place_of_business: String::new(),
            postal_code: String::new(),
            business_indicator: None,
        }
    }

    /// 地址行以 ", " 连接
    pub fn address(&self) -> String {
        self.address_lines.join(", ")
    }
}

/// 结构化查询接口返回的单个 JSON 对象
///
/// 所有字段在此处统一做一次 "缺失 / null → 空字符串" 处理，
/// 数字字段（如 `company_num`）转成字符串。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CroCompanyPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_num: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_status_desc: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub comp_type_desc: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_addr_1: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_addr_2: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_addr_3: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_addr_4: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub place_of_business: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub eircode: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_bus_ind: String,
}

impl From<CroCompanyPayload> for RegistryRecord {
    fn from(p: CroCompanyPayload) -> Self {
        let address_lines = [
            p.company_addr_1,
            p.company_addr_2,
            p.company_addr_3,
            p.company_addr_4,
        ]
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

        Self {
            entity_number: p.company_num.trim().to_string(),
            name: p.company_name.trim().to_string(),
            status_description: p.company_status_desc.trim().to_string(),
            entity_type_description: p.comp_type_desc.trim().to_string(),
            address_lines,
            place_of_business: p.place_of_business.trim().to_string(),
            postal_code: p.eircode.trim().to_string(),
            business_indicator: BusinessIndicator::from_code(&p.company_bus_ind),
        }
    }
}

// 字符串 / 数字 / null 都接受
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct LenientVisitor;

    impl<'de> Visitor<'de> for LenientVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number or null")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(String::new())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(LenientVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_into_record() {
        let payload: CroCompanyPayload = serde_json::from_value(json!({
            "company_num": 691054,
            "company_name": "ACME TRADING LIMITED ",
            "company_status_desc": "Normal",
            "comp_type_desc": "LTD - Private Company Limited by Shares",
            "company_addr_1": "1 Main Street",
            "company_addr_2": "",
            "company_addr_3": null,
            "company_addr_4": "Dublin 2",
            "place_of_business": "Dublin",
            "eircode": "D02 XY45",
            "company_bus_ind": "C"
        }))
        .unwrap();

        let record = RegistryRecord::from(payload);
        assert_eq!(record.entity_number, "691054");
        assert_eq!(record.name, "ACME TRADING LIMITED");
        assert_eq!(record.address_lines, vec!["1 Main Street", "Dublin 2"]);
        assert_eq!(record.address(), "1 Main Street, Dublin 2");
        assert_eq!(record.business_indicator, Some(BusinessIndicator::Company));
    }

    #[test]
    fn test_missing_fields_become_empty() {
        let payload: CroCompanyPayload =
            serde_json::from_value(json!({ "company_num": "602047" })).unwrap();
        let record = RegistryRecord::from(payload);
        assert_eq!(record.entity_number, "602047");
        assert!(record.name.is_empty());
        assert!(record.address_lines.is_empty());
        assert_eq!(record.business_indicator, None);
    }
}
