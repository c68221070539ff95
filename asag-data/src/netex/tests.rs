//! Unit tests for the NeTEx cursor and decoder.

use super::decode::parse_timestamp;
use super::{NetexCursor, ParseError};
use asag_core::{
    CoveredCode, EntityKind, InterchangeWeighting, NetexEntity, StopType, SubmodeKind,
};
use chrono::NaiveDate;
use rstest::{fixture, rstest};

fn decode_all(xml: &str) -> Result<Vec<NetexEntity>, ParseError> {
    NetexCursor::new(xml.as_bytes()).collect()
}

fn wrap(frame_content: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<PublicationDelivery xmlns="http://www.netex.org.uk/netex" xmlns:gml="http://www.opengis.net/gml/3.2" version="1.0">
  <dataObjects>
    <SiteFrame id="NSR:SiteFrame:1" version="1">{frame_content}</SiteFrame>
  </dataObjects>
</PublicationDelivery>"#
    )
}

#[fixture]
fn full_stop_place() -> String {
    wrap(
        r#"<stopPlaces>
      <StopPlace id="NSR:StopPlace:1" version="3">
        <validityConditions>
          <ValidBetween><FromDate>2017-05-13T00:00:00</FromDate></ValidBetween>
        </validityConditions>
        <keyList>
          <KeyValue><Key>IMPORTED_ID</Key><Value>TEL:StopPlace:0817</Value></KeyValue>
          <KeyValue><Key>IS_PARENT_STOP_PLACE</Key><Value>false</Value></KeyValue>
        </keyList>
        <Name lang="nor">Drangedal stasjon</Name>
        <Description>Ved sentrum</Description>
        <PrivateCode>DRA</PrivateCode>
        <Centroid><Location><Longitude>9.0647</Longitude><Latitude>59.0956</Latitude></Location></Centroid>
        <adjacentSites><SiteRef ref="NSR:StopPlace:10"/></adjacentSites>
        <ParentSiteRef ref="NSR:StopPlace:100" version="1"/>
        <PublicCode>12</PublicCode>
        <StopPlaceType>railStation</StopPlaceType>
        <Weighting>interchangeAllowed</Weighting>
        <RailSubmode>unknown</RailSubmode>
        <BusSubmode>railReplacementBus</BusSubmode>
        <quays>
          <Quay id="NSR:Quay:8" version="1">
            <Centroid><Location><Longitude>9.065</Longitude><Latitude>59.096</Latitude></Location></Centroid>
            <PublicCode>1</PublicCode>
          </Quay>
        </quays>
      </StopPlace>
    </stopPlaces>"#,
    )
}

#[rstest]
fn decodes_stop_place_fields(full_stop_place: String) {
    let entities = decode_all(&full_stop_place).expect("document should decode");

    let [NetexEntity::StopPlace(stop)] = entities.as_slice() else {
        panic!("expected a single stop place, got {entities:?}");
    };
    assert_eq!(stop.zone.id, "NSR:StopPlace:1");
    let name = stop.zone.name.as_ref().expect("name");
    assert_eq!(name.value, "Drangedal stasjon");
    assert_eq!(name.lang.as_deref(), Some("nor"));
    assert_eq!(stop.zone.private_code.as_deref(), Some("DRA"));
    assert_eq!(stop.zone.validity.len(), 1);
    assert_eq!(stop.stop_type, Some(StopType::RailStation));
    assert_eq!(stop.weighting, Some(InterchangeWeighting::InterchangeAllowed));
    assert_eq!(stop.public_code.as_deref(), Some("12"));
    assert!(stop.has_parent_site_ref);
    assert_eq!(stop.adjacent_site_refs, vec!["NSR:StopPlace:10".to_owned()]);
    assert_eq!(stop.is_parent_stop_place.as_deref(), Some("false"));
    let kinds: Vec<_> = stop.submodes.iter().map(|submode| submode.kind).collect();
    assert_eq!(kinds, vec![SubmodeKind::Rail, SubmodeKind::Bus]);
    let location = stop.zone.centroid.expect("centroid");
    assert!((location.longitude - 9.0647).abs() < f64::EPSILON);
    assert_eq!(stop.quays.len(), 1);
    assert_eq!(stop.quays[0].zone.id, "NSR:Quay:8");
    assert_eq!(stop.quays[0].public_code.as_deref(), Some("1"));
}

#[rstest]
fn finds_elements_inside_composite_frames() {
    let xml = r#"<PublicationDelivery><dataObjects>
      <CompositeFrame id="c"><frames>
        <SiteFrame id="s"><tariffZones>
          <TariffZone id="NSR:TariffZone:1"><Name>A</Name></TariffZone>
        </tariffZones></SiteFrame>
      </frames></CompositeFrame>
      <SiteFrame id="s2"><parkings>
        <Parking id="NSR:Parking:2"><Name>B</Name></Parking>
      </parkings></SiteFrame>
    </dataObjects></PublicationDelivery>"#;

    let entities = decode_all(xml).expect("document should decode");

    let kinds: Vec<_> = entities.iter().map(NetexEntity::kind).collect();
    assert_eq!(kinds, vec![EntityKind::TariffZone, EntityKind::Parking]);
}

#[rstest]
fn decodes_parking_fields() {
    let xml = wrap(
        r#"<parkings><Parking id="NSR:Parking:99">
        <Name>P-hus</Name>
        <Centroid><Location><Longitude>10.75</Longitude><Latitude>59.91</Latitude></Location></Centroid>
        <ParentSiteRef ref="NSR:StopPlace:1"/>
        <ParkingVehicleTypes>pedalCycle car</ParkingVehicleTypes>
        <Covered>covered</Covered>
        <TotalCapacity>120</TotalCapacity>
        <PrincipalCapacity>100</PrincipalCapacity>
        <NumberOfParkingLevels>2</NumberOfParkingLevels>
      </Parking></parkings>"#,
    );

    let entities = decode_all(&xml).expect("document should decode");

    let [NetexEntity::Parking(parking)] = entities.as_slice() else {
        panic!("expected a single parking, got {entities:?}");
    };
    assert_eq!(parking.total_capacity, Some(120));
    assert_eq!(parking.principal_capacity, Some(100));
    assert_eq!(parking.number_of_parking_levels, Some(2));
    assert_eq!(parking.covered, Some(CoveredCode::Covered));
    assert_eq!(parking.vehicle_types, vec!["pedalCycle", "car"]);
    assert!(parking.has_parent_site_ref);
}

#[rstest]
fn decodes_polygon_pos_list() {
    let xml = wrap(
        r#"<tariffZones><TariffZone id="NSR:TariffZone:7">
        <gml:Polygon gml:id="p1"><gml:exterior><gml:LinearRing>
          <gml:posList>59.2649 9.8468 59.3 9.9 59.2649 9.8468</gml:posList>
        </gml:LinearRing></gml:exterior></gml:Polygon>
      </TariffZone></tariffZones>"#,
    );

    let entities = decode_all(&xml).expect("document should decode");

    let polygon = entities[0].zone().polygon.as_ref().expect("polygon");
    let pairs: Vec<_> = polygon.pairs().collect();
    assert_eq!(pairs.first(), Some(&(59.2649, 9.8468)));
    assert_eq!(pairs.len(), 3);
}

#[rstest]
fn reads_direct_and_nested_validity_windows() {
    let xml = wrap(
        r#"<tariffZones><TariffZone id="NSR:TariffZone:3">
        <ValidBetween><ToDate>2030-01-01T00:00:00</ToDate></ValidBetween>
        <validityConditions><ValidBetween><FromDate>2020-01-01</FromDate></ValidBetween></validityConditions>
      </TariffZone></tariffZones>"#,
    );

    let entities = decode_all(&xml).expect("document should decode");

    let windows = &entities[0].zone().validity;
    assert_eq!(windows.len(), 2);
    assert!(windows[0].from.is_none());
    assert!(windows[0].to.is_some());
    assert!(windows[1].from.is_some());
}

#[rstest]
#[case::mismatched_tag(r#"<StopPlace id="a"><Name>x</Nome></StopPlace>"#)]
#[case::truncated(r#"<root><StopPlace id="a"><Name>x</Name>"#)]
fn malformed_documents_fail(#[case] xml: &str) {
    let mut cursor = NetexCursor::new(xml.as_bytes());

    let outcome = cursor.next().expect("an item should be yielded");

    assert!(matches!(
        outcome,
        Err(ParseError::Xml { .. } | ParseError::UnexpectedEof { .. })
    ));
    assert!(cursor.next().is_none(), "cursor should stop after an error");
}

#[rstest]
fn missing_id_is_reported() {
    let err = decode_all(&wrap("<TariffZone><Name>x</Name></TariffZone>"))
        .expect_err("missing id should fail");
    assert!(matches!(
        err,
        ParseError::Missing {
            kind: EntityKind::TariffZone,
            field: "id",
            ..
        }
    ));
}

#[rstest]
#[case::unknown_code(
    r#"<StopPlace id="S:1"><StopPlaceType>spaceport</StopPlaceType></StopPlace>"#,
    "UnknownCode"
)]
#[case::odd_pos_list(
    r#"<TariffZone id="T:1"><Polygon><exterior><LinearRing><posList>1 2 3</posList></LinearRing></exterior></Polygon></TariffZone>"#,
    "OddPositionList"
)]
#[case::bad_number(
    r#"<Parking id="P:1"><TotalCapacity>many</TotalCapacity></Parking>"#,
    "InvalidNumber"
)]
#[case::bad_latitude(
    r#"<StopPlace id="S:2"><Centroid><Location><Longitude>10</Longitude><Latitude>95</Latitude></Location></Centroid></StopPlace>"#,
    "InvalidCoordinate"
)]
#[case::missing_latitude(
    r#"<StopPlace id="S:3"><Centroid><Location><Longitude>10</Longitude></Location></Centroid></StopPlace>"#,
    "Missing"
)]
#[case::bad_timestamp(
    r#"<TariffZone id="T:2"><ValidBetween><FromDate>yesterday</FromDate></ValidBetween></TariffZone>"#,
    "InvalidTimestamp"
)]
fn shape_errors_are_fatal(#[case] element: &str, #[case] expected: &str) {
    let err = decode_all(&wrap(element)).expect_err("decoding should fail");

    let actual = match err {
        ParseError::UnknownCode { .. } => "UnknownCode",
        ParseError::OddPositionList { .. } => "OddPositionList",
        ParseError::InvalidNumber { .. } => "InvalidNumber",
        ParseError::InvalidCoordinate { .. } => "InvalidCoordinate",
        ParseError::Missing { .. } => "Missing",
        ParseError::InvalidTimestamp { .. } => "InvalidTimestamp",
        other => panic!("unexpected error {other:?}"),
    };
    assert_eq!(actual, expected);
}

#[rstest]
fn self_closing_elements_decode() {
    let entities =
        decode_all(&wrap(r#"<TariffZone id="NSR:TariffZone:9"/>"#)).expect("decode");
    assert_eq!(entities[0].zone().id, "NSR:TariffZone:9");
    assert!(!entities[0].zone().has_geometry());
}

#[rstest]
#[case("2017-05-13T00:00:00", 2017, 5, 13)]
#[case("2017-05-13T10:15:30.250", 2017, 5, 13)]
#[case("2017-05-13", 2017, 5, 13)]
fn parses_naive_timestamps(
    #[case] raw: &str,
    #[case] year: i32,
    #[case] month: u32,
    #[case] day: u32,
) {
    let parsed = parse_timestamp(raw).expect("timestamp should parse");
    assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(year, month, day).expect("date"));
}

#[rstest]
fn parses_offset_timestamps() {
    assert!(parse_timestamp("2017-05-13T00:00:00+02:00").is_some());
    assert!(parse_timestamp("2017-05-13T00:00:00Z").is_some());
    assert!(parse_timestamp("13.05.2017").is_none());
}
