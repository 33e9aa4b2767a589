use super::*;

#[test]
fn table_rows_line_up_with_variants() {
    assert_eq!(FilmStock::Color400.label(), "Color 400");
    assert_eq!(FilmStock::Color800.label(), "Color 800");
    assert_eq!(FilmStock::Mono400.label(), "Mono 400");
    assert_eq!(FilmStock::MonoHigh.label(), "Mono High");
}

#[test]
fn mono_stocks_have_no_overlay_and_a_stretch() {
    for stock in FilmStock::ALL {
        let p = stock.params();
        assert_eq!(stock.is_mono(), p.mono_k.is_some());
        if stock.is_mono() {
            assert!(p.overlay.is_none());
            assert_eq!(p.tone.saturation, 0.0);
        } else {
            assert!(p.overlay.is_some());
        }
    }
}

#[test]
fn glow_is_skipped_only_for_mono_high() {
    for stock in FilmStock::ALL {
        let glow = stock.params().glow;
        if stock == FilmStock::MonoHigh {
            assert!(glow.is_none());
        } else {
            let a = glow.unwrap();
            assert!((0.2..=0.25).contains(&a));
        }
    }
}

#[test]
fn parses_wire_ids_and_aliases() {
    assert_eq!("STOCK_A_400".parse::<FilmStock>().unwrap(), FilmStock::Color400);
    assert_eq!("stock-a-800".parse::<FilmStock>().unwrap(), FilmStock::Color800);
    assert_eq!("mono400".parse::<FilmStock>().unwrap(), FilmStock::Mono400);
    assert_eq!(" MONO_HIGH ".parse::<FilmStock>().unwrap(), FilmStock::MonoHigh);
    let err = "kodachrome".parse::<FilmStock>().unwrap_err();
    assert!(err.to_string().starts_with("invalid input:"));
}

#[test]
fn serde_uses_wire_ids() {
    let json = serde_json::to_string(&FilmStock::MonoHigh).unwrap();
    assert_eq!(json, "\"MONO_HIGH\"");
    let back: FilmStock = serde_json::from_str("\"color800\"").unwrap();
    assert_eq!(back, FilmStock::Color800);
    for stock in FilmStock::ALL {
        assert_eq!(stock.to_string(), stock.id());
    }
}
