#[cfg(test)]
mod output_tests {
    use std::collections::BTreeMap;
    use std::env::current_dir;
    use std::fs::File;
    use std::io::Read;

    use chrono::{TimeZone, Utc};
    use plist::Value;

    use crate::keyed_archive::{
        models::Unarchived,
        output::{to_json, to_plist_xml},
        unarchiver::unarchive,
    };

    fn read_fixture(name: &str) -> Vec<u8> {
        let fixture_path = current_dir()
            .unwrap()
            .as_path()
            .join("test_data/keyed_archive")
            .join(name);
        let mut file = File::open(fixture_path).unwrap();
        let mut bytes = vec![];
        file.read_to_end(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn can_render_object_fields_without_class() {
        let object = Unarchived::Object {
            class: Some("Person".to_string()),
            fields: BTreeMap::from([
                ("b".to_string(), Unarchived::Real(0.25)),
                ("a".to_string(), Unarchived::UnsignedInteger(u64::MAX)),
            ]),
        };

        assert_eq!(
            object.to_json().dump(),
            r#"{"a":18446744073709551615,"b":0.25}"#
        );
    }

    #[test]
    fn can_render_date() {
        let date = Unarchived::Date(Utc.with_ymd_and_hms(2023, 5, 1, 12, 30, 0).unwrap());
        assert_eq!(date.to_json().dump(), r#""2023-05-01T12:30:00.000Z""#);
    }

    #[test]
    fn can_convert_to_plist() {
        let result = unarchive(&read_fixture("dict.bin")).unwrap();
        let plist = result[0].to_plist();

        let dict = plist.as_dictionary().unwrap();
        assert_eq!(dict.get("int"), Some(&Value::Integer(1.into())));
        assert_eq!(
            dict.get("string").and_then(Value::as_string),
            Some("string")
        );
        assert_eq!(
            dict.get("array").and_then(Value::as_array).map(Vec::len),
            Some(3)
        );
    }

    #[test]
    fn can_write_xml_plist() {
        let result = unarchive(&read_fixture("onevalue.xml")).unwrap();
        let xml = to_plist_xml(&result).unwrap();

        assert!(xml.contains("<array>"));
        assert!(xml.contains("<true/>"));
        assert!(!xml.contains("NSKeyedArchiver"));

        let reparsed = Value::from_reader_xml(xml.as_bytes()).unwrap();
        assert_eq!(reparsed, Value::Array(vec![Value::Boolean(true)]));
    }

    #[test]
    fn can_render_empty_sequence() {
        assert_eq!(to_json(&[]).dump(), "[]");
    }
}
