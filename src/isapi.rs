use crate::error::IngestError;
use crate::lookup::LookupTables;
use crate::types::{DetectionEvent, EventTime, VehicleInfo};
use roxmltree::{Document, Node};

pub const ISAPI_NAMESPACE: &str = "http://www.isapi.org/ver20/XMLSchema";

/// Builds a detection event from an ISAPI `EventNotificationAlert` document.
///
/// Every field is the first matching descendant anywhere in the document, so
/// the exact nesting used by a given firmware does not matter.
pub fn parse_event(xml: &str, tables: &LookupTables) -> Result<DetectionEvent, IngestError> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();

    let date_time = text(root, &["dateTime"])?;
    let date_time = EventTime::parse(date_time).ok_or_else(|| IngestError::InvalidValue {
        field: "dateTime",
        value: date_time.to_string(),
    })?;

    let vehicle = match find(root, &["vehicleInfo"]) {
        Some(node) => Some(parse_vehicle(node, tables)?),
        None => None,
    };

    Ok(DetectionEvent {
        date_time,
        license_plate: text(root, &["licensePlate"])?.to_string(),
        plate_type: text(root, &["plateType"])?.to_string(),
        plate_color: text(root, &["plateColor"])?.to_string(),
        speed_limit: text(root, &["speedLimit"])?.to_string(),
        vehicle,
    })
}

fn parse_vehicle(node: Node, tables: &LookupTables) -> Result<VehicleInfo, IngestError> {
    Ok(VehicleInfo {
        vehicle_type: tables.vehicle_type(integer(node, &["vehicleType"])?)?,
        color: tables.vehicle_color(text(node, &["color"])?.trim())?,
        speed: integer(node, &["speed"])?,
        logo: tables.vehicle_logo(integer(node, &["vehicleLogoRecog"])?)?,
        // Firmware writes "vehile" in these two tags.
        sub_logo: tables.vehicle_logo(integer(
            node,
            &["vehicleSubLogoRecog", "vehileSubLogoRecog"],
        )?)?,
        model: integer(node, &["vehicleModel", "vehileModel"])?,
    })
}

/// First descendant (excluding `node` itself) named by any of `names`,
/// tried in order.
fn find<'a, 'i>(node: Node<'a, 'i>, names: &[&str]) -> Option<Node<'a, 'i>> {
    names.iter().find_map(|name| {
        node.descendants()
            .skip(1)
            .find(|n| n.has_tag_name((ISAPI_NAMESPACE, *name)))
    })
}

fn text<'a>(node: Node<'a, '_>, names: &[&'static str]) -> Result<&'a str, IngestError> {
    find(node, names)
        .map(|n| n.text().unwrap_or(""))
        .ok_or(IngestError::MissingField(names[0]))
}

fn integer(node: Node, names: &[&'static str]) -> Result<i64, IngestError> {
    let value = text(node, names)?;
    value
        .trim()
        .parse()
        .map_err(|_| IngestError::InvalidValue {
            field: names[0],
            value: value.to_string(),
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn alert(extra: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<EventNotificationAlert version="2.0" xmlns="http://www.isapi.org/ver20/XMLSchema">
<ipAddress>192.168.1.64</ipAddress>
<portNo>80</portNo>
<protocol>HTTP</protocol>
<channelID>1</channelID>
<dateTime>2023-05-10T14:23:11+08:00</dateTime>
<activePostCount>1</activePostCount>
<eventType>ANPR</eventType>
<eventState>active</eventState>
<ANPR>
<country>3</country>
<licensePlate>ABC1234</licensePlate>
<line>1</line>
<direction>forward</direction>
<confidenceLevel>98</confidenceLevel>
<plateType>unknown</plateType>
<plateColor>white</plateColor>
<licenseBright>0</licenseBright>
<speedLimit>60</speedLimit>
{}
</ANPR>
</EventNotificationAlert>"#,
            extra
        )
    }

    const VEHICLE: &str = "<vehicleInfo>
<index>12</index>
<colorDepth>2</colorDepth>
<vehicleType>3</vehicleType>
<color>white</color>
<speed>42</speed>
<vehicleLogoRecog>6</vehicleLogoRecog>
<vehicleSubLogoRecog>0</vehicleSubLogoRecog>
<vehicleModel>7</vehicleModel>
</vehicleInfo>";

    fn parse(xml: &str) -> Result<DetectionEvent, IngestError> {
        parse_event(xml, &LookupTables::default())
    }

    #[test]
    fn parses_plate_without_vehicle() {
        let event = parse(&alert("")).unwrap();
        assert_eq!(event.date_time.folder_name(), "2023-05-10_14-23-11");
        assert_eq!(event.license_plate, "ABC1234");
        assert_eq!(event.plate_type, "unknown");
        assert_eq!(event.plate_color, "white");
        assert_eq!(event.speed_limit, "60");
        assert_eq!(event.vehicle, None);
    }

    #[test]
    fn decodes_vehicle_through_tables() {
        let event = parse(&alert(VEHICLE)).unwrap();
        assert_eq!(
            event.vehicle,
            Some(VehicleInfo {
                vehicle_type: "Car",
                color: "White",
                speed: 42,
                logo: "Toyota",
                sub_logo: "Other",
                model: 7,
            })
        );
    }

    #[test]
    fn accepts_misspelt_vehicle_tags() {
        let vehicle = VEHICLE
            .replace("vehicleSubLogoRecog>0<", "vehileSubLogoRecog>3<")
            .replace("vehicleSubLogoRecog>", "vehileSubLogoRecog>")
            .replace("vehicleModel>", "vehileModel>");
        let info = parse(&alert(&vehicle)).unwrap().vehicle.unwrap();
        assert_eq!(info.sub_logo, "BMW");
        assert_eq!(info.model, 7);
    }

    #[test]
    fn missing_required_field() {
        let xml = alert("").replace("<speedLimit>60</speedLimit>", "");
        assert!(matches!(
            parse(&xml),
            Err(IngestError::MissingField("speedLimit"))
        ));
    }

    #[test]
    fn missing_vehicle_field() {
        let vehicle = VEHICLE.replace("<speed>42</speed>", "");
        assert!(matches!(
            parse(&alert(&vehicle)),
            Err(IngestError::MissingField("speed"))
        ));
    }

    #[test]
    fn empty_element_is_empty_string() {
        let xml = alert("").replace("<plateType>unknown</plateType>", "<plateType/>");
        assert_eq!(parse(&xml).unwrap().plate_type, "");
    }

    #[test]
    fn out_of_range_codes() {
        let vehicle = VEHICLE.replace("<vehicleType>3<", "<vehicleType>99<");
        assert!(matches!(
            parse(&alert(&vehicle)),
            Err(IngestError::Lookup { table: "vehicle type", .. })
        ));

        let vehicle = VEHICLE.replace("<color>white<", "<color>tartan<");
        assert!(matches!(
            parse(&alert(&vehicle)),
            Err(IngestError::Lookup { table: "vehicle color", .. })
        ));
    }

    #[test]
    fn non_numeric_code() {
        let vehicle = VEHICLE.replace("<speed>42<", "<speed>fast<");
        assert!(matches!(
            parse(&alert(&vehicle)),
            Err(IngestError::InvalidValue { field: "speed", .. })
        ));
    }

    #[test]
    fn bad_timestamp() {
        let xml = alert("").replace("2023-05-10T14:23:11+08:00", "tuesday");
        assert!(matches!(
            parse(&xml),
            Err(IngestError::InvalidValue { field: "dateTime", .. })
        ));
    }

    #[test]
    fn malformed_xml() {
        assert!(matches!(
            parse("<EventNotificationAlert><dateTime>"),
            Err(IngestError::Xml(_))
        ));
    }

    #[test]
    fn ignores_other_namespaces() {
        let xml = r#"<alert xmlns="urn:other">
<dateTime>2023-05-10T14:23:11</dateTime>
<licensePlate>XYZ</licensePlate>
<plateType>a</plateType>
<plateColor>b</plateColor>
<speedLimit>1</speedLimit>
</alert>"#;
        assert!(matches!(
            parse(xml),
            Err(IngestError::MissingField("dateTime"))
        ));
    }
}
