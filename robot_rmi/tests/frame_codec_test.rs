use robot_rmi::packets::*;
use robot_rmi::{ArmError, ArmPosition, JointsAngle};

#[test]
fn decodes_joint_angle_query() {
    let frame = Frame::parse("/f/bIII7III377III25IIIGetActualJointPosDegree()III/b/f").unwrap();
    assert_eq!(frame.id, 7);
    assert_eq!(frame.kind, 377);
    assert_eq!(frame.len, 25);
    assert_eq!(frame.message, "GetActualJointPosDegree()");
    assert_eq!(frame.command_kind(), Some(CommandKind::Query));
}

#[test]
fn declared_length_must_match_payload() {
    let result = Frame::parse("/f/bIII7III377III23IIIGetActualJointPosDegree()III/b/f");
    assert_eq!(
        result,
        Err(ArmError::LengthMismatch {
            declared: 23,
            actual: 25
        })
    );
}

#[test]
fn wrong_token_count_is_malformed() {
    for raw in [
        "",
        "/f/bIII7III377III1/b/f",
        "/f/bIII7III377III1III1IIIextraIII/b/f",
    ] {
        assert!(
            matches!(Frame::parse(raw), Err(ArmError::MalformedFrame(_))),
            "{:?}",
            raw
        );
    }
}

#[test]
fn non_integer_header_fields_are_malformed() {
    for raw in [
        "/f/bIIIxIII377III1III1III/b/f",
        "/f/bIII7IIIqueryIII1III1III/b/f",
        "/f/bIII7III377IIIoneIII1III/b/f",
        "/f/bIII99999999999999999999III377III1III1III/b/f",
    ] {
        assert!(
            matches!(Frame::parse(raw), Err(ArmError::MalformedFrame(_))),
            "{:?}",
            raw
        );
    }
}

#[test]
fn header_fields_outside_the_id_space_still_decode() {
    let frame = Frame::parse("/f/bIII-1III377III1III1III/b/f").unwrap();
    assert_eq!(frame.id, -1);

    let frame = Frame::parse("/f/bIII5000000000III-3III1III1III/b/f").unwrap();
    assert_eq!(frame.id, 5_000_000_000);
    assert_eq!(frame.kind, -3);
    assert_eq!(frame.command_kind(), None);
}

#[test]
fn negative_length_is_a_length_mismatch() {
    let result = Frame::parse("/f/bIII7III377III-7III1III/b/f");
    assert_eq!(
        result,
        Err(ArmError::LengthMismatch {
            declared: -7,
            actual: 1
        })
    );
}

#[test]
fn wrong_markers_are_malformed() {
    let result = Frame::parse("/x/bIII7III377III1III1III/b/f");
    assert!(matches!(result, Err(ArmError::MalformedFrame(_))));
}

#[test]
fn empty_payload_is_allowed() {
    let frame = Frame::parse("/f/bIII3III377III0IIIIII/b/f").unwrap();
    assert_eq!(frame.message, "");
    assert_eq!(frame.len, 0);
}

#[test]
fn encodes_in_wire_order() {
    let frame = new_query_poses(42);
    assert_eq!(frame.encode(), "/f/bIII42III377III18IIIGetActualTCPPose()III/b/f");
    assert_eq!(Frame::parse(&frame.encode()).unwrap(), frame);
}

#[test]
fn query_constructors() {
    let angles = new_query_angles(5);
    assert_eq!(angles.id, 5);
    assert_eq!(angles.kind, 377);
    assert_eq!(angles.message, GET_JOINT_ANGLES);
    assert_eq!(angles.len, GET_JOINT_ANGLES.len() as i64);

    let target = JointsAngle::new([-10.0, 10.0, 0.0, 0.0, 0.0, 0.5]);
    let fk = new_query_forward_kin(6, &target);
    assert_eq!(fk.message, "GetForwardKin(-10,10,0,0,0,0.5)");
    assert_eq!(fk.len, fk.message.len() as i64);
    assert_eq!(fk.command_kind(), Some(CommandKind::Query));
}

#[test]
fn move_j_embeds_angles_pose_and_motion_params() {
    let angles = JointsAngle::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let pose = ArmPosition::new([100.0, 200.0, 300.0, 180.0, 0.0, 90.0]);
    let params = MotionParams::new(50.0, 20.0, 100.0);

    let frame = new_move_j(9, &angles, &pose, &params);

    assert_eq!(frame.kind, 201);
    assert_eq!(frame.command_kind(), Some(CommandKind::MoveJ));
    assert_eq!(
        frame.message,
        "MoveJ(1,2,3,4,5,6,100,200,300,180,0,90,0,0,50.000000,20.000000,100,\
         0.000,0.000,0.000,0.000,100.000000,0,0,0,0,0,0,0)"
    );
    assert_eq!(frame.len, frame.message.len() as i64);
}

#[test]
fn motion_params_clamp_to_their_ranges() {
    let params = MotionParams::new(-1.0, 101.0, 900.0);
    assert_eq!(params.speed, 0.0);
    assert_eq!(params.acceleration, 100.0);
    assert_eq!(params.blend_time_ms, 500.0);

    let params = MotionParams::new(f64::NAN, 55.5, -3.0);
    assert_eq!(params.speed, 0.0);
    assert_eq!(params.acceleration, 55.5);
    assert_eq!(params.blend_time_ms, 0.0);
}

#[test]
fn extracts_frames_split_and_coalesced() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(b"/f/bIII1III377III1III1III/b/f/f/bIII2III3");
    let frames = extract_frames(&mut buffer);
    assert_eq!(frames.len(), 1);

    buffer.extend_from_slice(b"77III9III0,0,0,0,0III/b/f");
    let frames = extract_frames(&mut buffer);
    assert_eq!(frames.len(), 1);
    let frame = Frame::parse(frames[0].as_ref().unwrap()).unwrap();
    assert_eq!(frame.id, 2);
    assert_eq!(frame.message, "0,0,0,0,0");
    assert!(buffer.is_empty());
}
