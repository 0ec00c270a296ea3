//! Augmenta protocol decoder.
//!
//! Maps `(protocol version, address, arguments)` to a typed [`ProtocolEvent`].
//! Decoding is pure: it never looks at registry state, never mirrors, and
//! never applies the desired-object filter. Those happen after decoding.
//!
//! Every layout is validated once, up front. A message must carry at least the
//! positions its layout reads (extra trailing arguments are ignored) and each
//! `i`/`f` position must hold an OSC int32/float32 respectively.

use crate::error::DecodeError;
use crate::protocol::osc::OscArg;
use augmenta_event_system::{
    BoundingBox, DataChannel, ObjectAge, ObjectId, OutputState, Vec2, Vec2i,
};
use serde::{Deserialize, Serialize};

/// Wire protocol revision emitted by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    V1,
    #[default]
    V2,
}

impl std::str::FromStr for ProtocolVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(ProtocolVersion::V1),
            "v2" | "2" => Ok(ProtocolVersion::V2),
            other => Err(format!("unknown protocol version '{other}'")),
        }
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolVersion::V1 => f.write_str("v1"),
            ProtocolVersion::V2 => f.write_str("v2"),
        }
    }
}

/// Main channel payload.
#[derive(Debug, Clone, PartialEq)]
pub struct MainData {
    pub age: ObjectAge,
    pub centroid: Vec2,
    pub velocity: Vec2,
    /// Always 0 in V1
    pub orientation: f32,
    /// Only reported by V1
    pub depth: Option<f32>,
    pub bounding_box: BoundingBox,
    /// Always 0 in V1
    pub rotation: f32,
    /// V1 sends the highest point position with the main data, V2 does not
    pub highest_point: Option<Vec2>,
    /// Height of the highest point in meters
    pub height: f32,
}

/// Extra channel payload (V2 only).
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraData {
    pub highest_point: Vec2,
    pub distance: f32,
    pub reflectivity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectPayload {
    Main(MainData),
    Extra(ExtraData),
}

/// Identity plus channel payload of an enter/update message.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectData {
    pub id: ObjectId,
    pub oid: i32,
    pub payload: ObjectPayload,
}

impl ObjectData {
    pub fn channel(&self) -> DataChannel {
        match self.payload {
            ObjectPayload::Main(_) => DataChannel::Main,
            ObjectPayload::Extra(_) => DataChannel::Extra,
        }
    }
}

/// Scene size as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneSize {
    /// V1: pixels, scaled by the configured pixel size
    Pixels { width: i32, height: i32 },
    /// V2: already in meters
    Meters { width: f32, height: f32 },
}

/// A decoded message.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolEvent {
    ObjectEnter(ObjectData),
    ObjectUpdate(ObjectData),
    ObjectLeave {
        id: ObjectId,
        oid: i32,
        channel: DataChannel,
    },
    SceneUpdate {
        object_count: i32,
        size: SceneSize,
    },
    OutputUpdate(OutputState),
}

impl ProtocolEvent {
    /// Rank of the object the event refers to, if it is an object event.
    pub fn oid(&self) -> Option<i32> {
        match self {
            ProtocolEvent::ObjectEnter(data) | ProtocolEvent::ObjectUpdate(data) => Some(data.oid),
            ProtocolEvent::ObjectLeave { oid, .. } => Some(*oid),
            _ => None,
        }
    }
}

/// Decodes one message.
///
/// # Returns
///
/// * `Ok(Some(event))` for a recognized address with a valid layout
/// * `Ok(None)` for an address this version does not know
/// * `Err(DecodeError)` for a recognized address whose arguments do not fit
pub fn decode(
    version: ProtocolVersion,
    address: &str,
    args: &[OscArg],
) -> Result<Option<ProtocolEvent>, DecodeError> {
    let address = normalize_address(address);
    match version {
        ProtocolVersion::V1 => decode_v1(address, args),
        ProtocolVersion::V2 => decode_v2(address, args),
    }
}

/// Drops a single trailing slash, so `/scene/` and `/scene` are the same.
fn normalize_address(address: &str) -> &str {
    match address.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => address,
    }
}

fn decode_v1(address: &str, args: &[OscArg]) -> Result<Option<ProtocolEvent>, DecodeError> {
    let event = match address {
        "/au/personEntered" => ProtocolEvent::ObjectEnter(v1_object(address, args)?),
        "/au/personUpdated" => ProtocolEvent::ObjectUpdate(v1_object(address, args)?),
        "/au/personWillLeave" => {
            let a = Args::new(address, args, 2)?;
            ProtocolEvent::ObjectLeave {
                id: a.int(0)?,
                oid: a.int(1)?,
                channel: DataChannel::Main,
            }
        }
        "/au/scene" => {
            let a = Args::new(address, args, 7)?;
            ProtocolEvent::SceneUpdate {
                object_count: a.int(2)?,
                size: SceneSize::Pixels {
                    width: a.int(5)?,
                    height: a.int(6)?,
                },
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(event))
}

fn v1_object(address: &str, args: &[OscArg]) -> Result<ObjectData, DecodeError> {
    let a = Args::new(address, args, 15)?;
    Ok(ObjectData {
        id: a.int(0)?,
        oid: a.int(1)?,
        payload: ObjectPayload::Main(MainData {
            age: ObjectAge::Frames(a.int(2)?),
            centroid: a.vec2(3)?,
            velocity: a.vec2(5)?,
            orientation: 0.0,
            depth: Some(a.float(7)?),
            bounding_box: a.bounding_box(8)?,
            rotation: 0.0,
            highest_point: Some(a.vec2(12)?),
            height: a.float(14)?,
        }),
    })
}

fn decode_v2(address: &str, args: &[OscArg]) -> Result<Option<ProtocolEvent>, DecodeError> {
    let event = match address {
        "/object/enter" => ProtocolEvent::ObjectEnter(v2_main(address, args)?),
        "/object/update" => ProtocolEvent::ObjectUpdate(v2_main(address, args)?),
        "/object/enter/extra" => ProtocolEvent::ObjectEnter(v2_extra(address, args)?),
        "/object/update/extra" => ProtocolEvent::ObjectUpdate(v2_extra(address, args)?),
        "/object/leave" | "/object/leave/extra" => {
            let a = Args::new(address, args, 3)?;
            ProtocolEvent::ObjectLeave {
                id: a.int(1)?,
                oid: a.int(2)?,
                channel: if address.ends_with("/extra") {
                    DataChannel::Extra
                } else {
                    DataChannel::Main
                },
            }
        }
        "/scene" => {
            // The sensor prefixes the scene message with its frame counter.
            let first = if args.len() >= 4 { 1 } else { 0 };
            let a = Args::new(address, args, first + 3)?;
            ProtocolEvent::SceneUpdate {
                object_count: a.int(first)?,
                size: SceneSize::Meters {
                    width: a.float(first + 1)?,
                    height: a.float(first + 2)?,
                },
            }
        }
        "/fusion" => {
            let a = Args::new(address, args, 6)?;
            ProtocolEvent::OutputUpdate(OutputState {
                offset: a.vec2(0)?,
                size_in_meters: a.vec2(2)?,
                size_in_pixels: Vec2i::new(a.int(4)?, a.int(5)?),
            })
        }
        _ => return Ok(None),
    };
    Ok(Some(event))
}

fn v2_main(address: &str, args: &[OscArg]) -> Result<ObjectData, DecodeError> {
    let a = Args::new(address, args, 15)?;
    Ok(ObjectData {
        id: a.int(1)?,
        oid: a.int(2)?,
        payload: ObjectPayload::Main(MainData {
            age: ObjectAge::Seconds(a.float(3)?),
            centroid: a.vec2(4)?,
            velocity: a.vec2(6)?,
            orientation: a.float(8)?,
            depth: None,
            bounding_box: a.bounding_box(9)?,
            rotation: a.float(13)?,
            highest_point: None,
            height: a.float(14)?,
        }),
    })
}

fn v2_extra(address: &str, args: &[OscArg]) -> Result<ObjectData, DecodeError> {
    let a = Args::new(address, args, 7)?;
    Ok(ObjectData {
        id: a.int(1)?,
        oid: a.int(2)?,
        payload: ObjectPayload::Extra(ExtraData {
            highest_point: a.vec2(3)?,
            distance: a.float(5)?,
            reflectivity: a.float(6)?,
        }),
    })
}

/// Argument list that has passed the arity check for its layout.
struct Args<'a> {
    address: &'a str,
    args: &'a [OscArg],
}

impl<'a> Args<'a> {
    fn new(address: &'a str, args: &'a [OscArg], expected: usize) -> Result<Self, DecodeError> {
        if args.len() < expected {
            return Err(DecodeError::Arity {
                address: address.to_string(),
                expected,
                actual: args.len(),
            });
        }
        Ok(Self { address, args })
    }

    fn int(&self, index: usize) -> Result<i32, DecodeError> {
        match &self.args[index] {
            OscArg::Int(v) => Ok(*v),
            other => Err(self.type_error(index, "int32", other)),
        }
    }

    fn float(&self, index: usize) -> Result<f32, DecodeError> {
        match &self.args[index] {
            OscArg::Float(v) => Ok(*v),
            other => Err(self.type_error(index, "float32", other)),
        }
    }

    fn vec2(&self, index: usize) -> Result<Vec2, DecodeError> {
        Ok(Vec2::new(self.float(index)?, self.float(index + 1)?))
    }

    fn bounding_box(&self, index: usize) -> Result<BoundingBox, DecodeError> {
        Ok(BoundingBox::new(
            self.float(index)?,
            self.float(index + 1)?,
            self.float(index + 2)?,
            self.float(index + 3)?,
        ))
    }

    fn type_error(&self, index: usize, expected: &'static str, actual: &OscArg) -> DecodeError {
        DecodeError::ArgumentType {
            address: self.address.to_string(),
            index,
            expected,
            actual: actual.type_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::osc::OscArg::{Float as F, Int as I};

    fn v2_object_args(id: i32, oid: i32) -> Vec<OscArg> {
        vec![
            I(100),
            I(id),
            I(oid),
            F(1.5),
            F(0.5),
            F(0.25),
            F(0.1),
            F(-0.1),
            F(90.0),
            F(0.4),
            F(0.2),
            F(0.2),
            F(0.1),
            F(45.0),
            F(1.8),
        ]
    }

    #[test]
    fn test_v2_object_update_layout() {
        let event = decode(ProtocolVersion::V2, "/object/update", &v2_object_args(3, 1))
            .unwrap()
            .unwrap();

        let ProtocolEvent::ObjectUpdate(data) = event else {
            panic!("expected update, got {event:?}");
        };
        assert_eq!((data.id, data.oid), (3, 1));
        assert_eq!(data.channel(), DataChannel::Main);

        let ObjectPayload::Main(main) = data.payload else {
            panic!("expected main payload");
        };
        assert_eq!(main.age, ObjectAge::Seconds(1.5));
        assert_eq!(main.centroid, Vec2::new(0.5, 0.25));
        assert_eq!(main.velocity, Vec2::new(0.1, -0.1));
        assert_eq!(main.orientation, 90.0);
        assert_eq!(main.bounding_box, BoundingBox::new(0.4, 0.2, 0.2, 0.1));
        assert_eq!(main.rotation, 45.0);
        assert_eq!(main.height, 1.8);
        assert_eq!(main.highest_point, None);
        assert_eq!(main.depth, None);
    }

    #[test]
    fn test_v1_person_layout() {
        let args = vec![
            I(7),
            I(0),
            I(30),
            F(0.5),
            F(0.5),
            F(0.0),
            F(0.0),
            F(2.5),
            F(0.4),
            F(0.4),
            F(0.2),
            F(0.2),
            F(0.45),
            F(0.55),
            F(1.7),
        ];
        let event = decode(ProtocolVersion::V1, "/au/personEntered/", &args)
            .unwrap()
            .unwrap();

        let ProtocolEvent::ObjectEnter(ObjectData {
            id: 7,
            oid: 0,
            payload: ObjectPayload::Main(main),
        }) = event
        else {
            panic!("unexpected event {event:?}");
        };
        assert_eq!(main.age, ObjectAge::Frames(30));
        assert_eq!(main.depth, Some(2.5));
        assert_eq!(main.highest_point, Some(Vec2::new(0.45, 0.55)));
        assert_eq!(main.height, 1.7);
        assert_eq!(main.orientation, 0.0);
    }

    #[test]
    fn test_v2_extra_and_leave() {
        let extra = decode(
            ProtocolVersion::V2,
            "/object/update/extra",
            &[I(1), I(4), I(2), F(0.3), F(0.6), F(3.2), F(0.9)],
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            extra,
            ProtocolEvent::ObjectUpdate(ObjectData {
                id: 4,
                oid: 2,
                payload: ObjectPayload::Extra(ExtraData {
                    highest_point: Vec2::new(0.3, 0.6),
                    distance: 3.2,
                    reflectivity: 0.9,
                }),
            })
        );

        let leave = decode(ProtocolVersion::V2, "/object/leave/extra", &[I(1), I(4), I(2)])
            .unwrap()
            .unwrap();
        assert_eq!(
            leave,
            ProtocolEvent::ObjectLeave {
                id: 4,
                oid: 2,
                channel: DataChannel::Extra
            }
        );
    }

    #[test]
    fn test_scene_variants() {
        let v1 = decode(
            ProtocolVersion::V1,
            "/au/scene",
            &[I(0), I(0), I(5), F(0.0), F(0.0), I(2000), I(1000)],
        )
        .unwrap();
        assert_eq!(
            v1,
            Some(ProtocolEvent::SceneUpdate {
                object_count: 5,
                size: SceneSize::Pixels {
                    width: 2000,
                    height: 1000
                },
            })
        );

        let with_frame = decode(ProtocolVersion::V2, "/scene", &[I(42), I(3), F(8.0), F(6.0)]).unwrap();
        let without_frame = decode(ProtocolVersion::V2, "/scene/", &[I(3), F(8.0), F(6.0)]).unwrap();
        assert_eq!(with_frame, without_frame);
        assert_eq!(
            with_frame,
            Some(ProtocolEvent::SceneUpdate {
                object_count: 3,
                size: SceneSize::Meters {
                    width: 8.0,
                    height: 6.0
                },
            })
        );
    }

    #[test]
    fn test_fusion_layout() {
        let event = decode(
            ProtocolVersion::V2,
            "/fusion",
            &[F(0.5), F(1.0), F(4.0), F(3.0), I(1920), I(1080)],
        )
        .unwrap();
        assert_eq!(
            event,
            Some(ProtocolEvent::OutputUpdate(OutputState {
                offset: Vec2::new(0.5, 1.0),
                size_in_meters: Vec2::new(4.0, 3.0),
                size_in_pixels: Vec2i::new(1920, 1080),
            }))
        );
    }

    #[test]
    fn test_short_message_is_arity_error() {
        let err = decode(ProtocolVersion::V2, "/object/enter", &[I(0), I(1), I(2)]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Arity {
                address: "/object/enter".to_string(),
                expected: 15,
                actual: 3
            }
        );
    }

    #[test]
    fn test_wrong_type_is_reported_with_index() {
        let mut args = v2_object_args(1, 0);
        args[4] = I(1);
        let err = decode(ProtocolVersion::V2, "/object/enter", &args).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::ArgumentType {
                index: 4,
                expected: "float32",
                actual: "int32",
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_address_and_wrong_version_are_ignored() {
        assert_eq!(decode(ProtocolVersion::V2, "/object/dance", &[]).unwrap(), None);
        assert_eq!(
            decode(ProtocolVersion::V1, "/object/enter", &v2_object_args(1, 0)).unwrap(),
            None
        );
        assert_eq!(decode(ProtocolVersion::V2, "/", &[]).unwrap(), None);
    }

    #[test]
    fn test_version_parsing() {
        assert_eq!("V1".parse::<ProtocolVersion>(), Ok(ProtocolVersion::V1));
        assert_eq!("2".parse::<ProtocolVersion>(), Ok(ProtocolVersion::V2));
        assert!("v3".parse::<ProtocolVersion>().is_err());
    }
}
