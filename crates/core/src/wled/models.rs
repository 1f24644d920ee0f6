use serde::{Deserialize, Serialize};

/// Subset of the `/json/info` document the daemon cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    #[serde(rename = "ver")]
    pub version: String,
}

/// Partial update for the `/json/state` endpoint. Absent fields are left
/// untouched by the device.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seg: Option<Vec<SegmentUpdate>>,
}

/// Update for one addressable segment. `cct` is the relative color
/// temperature on the device's 0..=255 scale.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentUpdate {
    pub id: u8,
    pub bri: u8,
    pub cct: u8,
}

impl StateUpdate {
    /// Fixture-wide power and global brightness.
    pub fn master(on: bool, brightness: u8) -> Self {
        Self {
            on: Some(on),
            bri: Some(brightness),
            seg: None,
        }
    }

    /// Brightness and color temperature for one segment.
    pub fn segment(id: u8, brightness: u8, color_temp: u8) -> Self {
        Self {
            on: None,
            bri: None,
            seg: Some(vec![SegmentUpdate {
                id,
                bri: brightness,
                cct: color_temp,
            }]),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn master_update_serializes_without_segments() {
        let update = StateUpdate::master(true, 255);
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"on": true, "bri": 255})
        );
    }

    #[test]
    fn segment_update_serializes_without_master_fields() {
        let update = StateUpdate::segment(0, 100, 127);
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"seg": [{"id": 0, "bri": 100, "cct": 127}]})
        );
    }

    #[test]
    fn device_info_tolerates_unknown_fields() {
        let info: DeviceInfo = serde_json::from_value(json!({
            "name": "WLED",
            "ver": "0.14.4",
            "leds": {"count": 30},
            "udpport": 21324
        }))
        .unwrap();
        assert_eq!(info.name, "WLED");
        assert_eq!(info.version, "0.14.4");
    }
}
