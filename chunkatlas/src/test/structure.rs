use crate::Structure;

#[test]
fn parses_exact_names() {
    for s in Structure::ALL {
        if s != Structure::Unknown {
            assert_eq!(Structure::parse(s.nbt_name()), s);
        }
    }
}

#[test]
fn parse_ignores_case_and_namespace() {
    assert_eq!(Structure::parse("Village"), Structure::Village);
    assert_eq!(Structure::parse("EndCity"), Structure::EndCity);
    assert_eq!(Structure::parse("minecraft:mansion"), Structure::Mansion);
    assert_eq!(Structure::parse("Desert_Pyramid"), Structure::DesertPyramid);
}

#[test]
fn parse_takes_longest_contained_name() {
    assert_eq!(Structure::parse("minecraft:village_plains"), Structure::Village);
    assert_eq!(Structure::parse("ocean_ruin_warm"), Structure::OceanRuin);
    assert_eq!(Structure::parse("mineshaft_mesa"), Structure::Mineshaft);
}

#[test]
fn unknown_names() {
    assert_eq!(Structure::parse("minecraft:ancient_city"), Structure::Unknown);
    assert_eq!(Structure::parse(""), Structure::Unknown);
}

#[test]
fn small_structures_outrank_large_ones() {
    assert!(Structure::BuriedTreasure.priority() > Structure::Village.priority());
    assert!(Structure::Igloo.priority() > Structure::Mineshaft.priority());
    assert!(Structure::Unknown.priority() < Structure::Mineshaft.priority());
}

#[test]
fn serializes_as_nbt_name() {
    for s in Structure::ALL {
        assert_eq!(
            serde_json::to_string(&s).unwrap(),
            format!("\"{}\"", s.nbt_name())
        );
    }
}
