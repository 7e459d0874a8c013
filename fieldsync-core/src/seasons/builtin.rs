//! Builtin season layouts.
//!
//! Column positions refer to the legacy ranking exports. For example the
//! 2019 export header is
//! `Rank, Team, Ranking Score, Cargo, Hatch Panel, HAB Climb, Sandstorm Bonus, Record (W-L-T), DQ, Played`.

use fieldsync_sdk::config::{FormatVersion, HeaderProbe, RecordLayout, SeasonLayout, SortOrderInfo};

fn info(columns: &[(&str, u8)]) -> Vec<SortOrderInfo> {
    columns
        .iter()
        .map(|(name, precision)| SortOrderInfo::new(*name, *precision))
        .collect()
}

fn standard(
    year: u16,
    matches_played: usize,
    record: RecordLayout,
    dq: Option<usize>,
    sort_orders: &[usize],
    sort_order_info: Vec<SortOrderInfo>,
) -> SeasonLayout {
    SeasonLayout {
        year,
        format: FormatVersion::Standard,
        detect: None,
        matches_played: Some(matches_played),
        record,
        dq,
        qual_average: None,
        sort_orders: sort_orders.to_vec(),
        sort_order_info,
    }
}

pub(super) fn layouts() -> Vec<SeasonLayout> {
    let mut layouts = Vec::new();

    // Rank, Team, W, L, T, Played, QS, RS, MP
    for year in 2007..=2009 {
        layouts.push(standard(
            year,
            5,
            RecordLayout::Columns([2, 3, 4]),
            None,
            &[6, 7, 8],
            info(&[("Qual Score", 0), ("Ranking Score", 2), ("Match Points", 0)]),
        ));
    }

    // Rank, Team, Seeding Score, Coopertition Bonus, Hanging Points, Played
    layouts.push(standard(
        2010,
        5,
        RecordLayout::None,
        None,
        &[2, 3, 4],
        info(&[
            ("Seeding Score", 0),
            ("Coopertition Bonus", 0),
            ("Hanging Points", 0),
        ]),
    ));

    // Rank, Team, W, L, T, Played, QS, RS
    layouts.push(standard(
        2011,
        5,
        RecordLayout::Columns([2, 3, 4]),
        None,
        &[6, 7],
        info(&[("Qual Score", 0), ("Ranking Score", 2)]),
    ));

    // Rank, Team, QS, Hybrid, Bridge, Teleop, Coop, Record (W-L-T), DQ, Played
    layouts.push(standard(
        2012,
        9,
        RecordLayout::Composite(7),
        Some(8),
        &[2, 3, 4, 5],
        info(&[("Qual Score", 0), ("Hybrid", 0), ("Bridge", 0), ("Teleop", 0)]),
    ));

    // Rank, Team, QS, Auto, Climb, Teleop, Record (W-L-T), DQ, Played
    layouts.push(standard(
        2013,
        8,
        RecordLayout::Composite(6),
        Some(7),
        &[2, 3, 4, 5],
        info(&[("Qual Score", 0), ("Auto", 0), ("Climb", 0), ("Teleop", 0)]),
    ));

    // Rank, Team, QS, Assist, Auto, Truss & Catch, Teleop, Record (W-L-T), DQ, Played
    layouts.push(standard(
        2014,
        9,
        RecordLayout::Composite(7),
        Some(8),
        &[2, 3, 4, 5, 6],
        info(&[
            ("Qual Score", 0),
            ("Assist", 0),
            ("Auto", 0),
            ("Truss & Catch", 0),
            ("Teleop", 0),
        ]),
    ));

    // Rank, Team, QualAvg, Auto, Container, Coopertition, Litter, Tote, Played
    layouts.push(SeasonLayout {
        qual_average: Some(2),
        ..standard(
            2015,
            8,
            RecordLayout::None,
            None,
            &[2, 5, 3, 4, 7, 6],
            info(&[
                ("Qual Avg.", 1),
                ("Coopertition", 0),
                ("Auto", 0),
                ("Container", 0),
                ("Tote", 0),
                ("Litter", 0),
            ]),
        )
    });

    // Rank, Team, Ranking Score, Auto, Scale/Challenge, Goals, Defense, Record (W-L-T), Played
    let info_2016 = info(&[
        ("Ranking Score", 0),
        ("Auto", 0),
        ("Scale/Challenge", 0),
        ("Goals", 0),
        ("Defense", 0),
    ]);
    layouts.push(standard(
        2016,
        8,
        RecordLayout::Composite(7),
        None,
        &[2, 3, 4, 5, 6],
        info_2016.clone(),
    ));
    // Some 2016 off-season events exported Auto ahead of Ranking Score.
    layouts.push(SeasonLayout {
        format: FormatVersion::Offseason,
        detect: Some(HeaderProbe {
            column: 2,
            header: "Auto".to_owned(),
        }),
        ..standard(
            2016,
            8,
            RecordLayout::Composite(7),
            None,
            &[3, 2, 4, 5, 6],
            info_2016,
        )
    });

    // Rank, Team, Ranking Score, Match Points, Auto, Rotor, Touchpad, Pressure, Record (W-L-T), Played
    layouts.push(standard(
        2017,
        9,
        RecordLayout::Composite(8),
        None,
        &[2, 3, 4, 5, 6, 7],
        info(&[
            ("Ranking Score", 2),
            ("Match Points", 0),
            ("Auto", 0),
            ("Rotor", 0),
            ("Touchpad", 0),
            ("Pressure", 0),
        ]),
    ));

    // Rank, Team, Ranking Score, Park/Climb Points, Auto, Ownership, Vault, Record (W-L-T), DQ, Played
    layouts.push(standard(
        2018,
        9,
        RecordLayout::Composite(7),
        Some(8),
        &[2, 3, 4, 5, 6],
        info(&[
            ("Ranking Score", 2),
            ("Park/Climb Points", 0),
            ("Auto", 0),
            ("Ownership", 0),
            ("Vault", 0),
        ]),
    ));

    layouts.push(standard(
        2019,
        9,
        RecordLayout::Composite(7),
        Some(8),
        &[2, 3, 4, 5, 6],
        info(&[
            ("Ranking Score", 2),
            ("Cargo", 0),
            ("Hatch Panel", 0),
            ("HAB Climb", 0),
            ("Sandstorm Bonus", 0),
        ]),
    ));

    // Rank, Team, Ranking Score, Auto, End Game, Teleop Cell + CPanel, Record (W-L-T), DQ, Played
    layouts.push(standard(
        2020,
        8,
        RecordLayout::Composite(6),
        Some(7),
        &[2, 3, 4, 5],
        info(&[
            ("Ranking Score", 2),
            ("Auto", 0),
            ("End Game", 0),
            ("Teleop Cell + CPanel", 0),
        ]),
    ));

    // Rank, Team, Ranking Score, Avg Match, Avg Hangar, Avg Taxi + Auto Cargo, Record (W-L-T), DQ, Played
    layouts.push(standard(
        2022,
        8,
        RecordLayout::Composite(6),
        Some(7),
        &[2, 3, 4, 5],
        info(&[
            ("Ranking Score", 2),
            ("Avg Match", 2),
            ("Avg Hangar", 2),
            ("Avg Taxi + Auto Cargo", 2),
        ]),
    ));

    // Rank, Team, Ranking Score, Avg Match, Avg Charge Station, Avg Auto, Record (W-L-T), DQ, Played
    layouts.push(standard(
        2023,
        8,
        RecordLayout::Composite(6),
        Some(7),
        &[2, 3, 4, 5],
        info(&[
            ("Ranking Score", 2),
            ("Avg Match", 2),
            ("Avg Charge Station", 2),
            ("Avg Auto", 2),
        ]),
    ));

    // Rank, Team, Ranking Score, Avg Coop, Avg Match, Avg Auto, Avg Stage, Record (W-L-T), DQ, Played
    layouts.push(standard(
        2024,
        9,
        RecordLayout::Composite(7),
        Some(8),
        &[2, 3, 4, 5, 6],
        info(&[
            ("Ranking Score", 2),
            ("Avg Coop", 2),
            ("Avg Match", 2),
            ("Avg Auto", 2),
            ("Avg Stage", 2),
        ]),
    ));

    layouts
}
