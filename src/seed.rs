//! Static data shipped with the library: the starting match catalog and
//! the team directory users pick a favorite from.

use crate::model::{
    Competition, Engagement, Match, MatchTeam, PenaltyScore, Score, Stadium, Team,
};

fn side(name: &str, country: &str) -> MatchTeam {
    MatchTeam {
        name: name.to_owned(),
        logo: format!("/logos/{}.png", slug(name)),
        country: country.to_owned(),
    }
}

fn competition(name: &str) -> Competition {
    Competition {
        name: name.to_owned(),
        logo: format!("/competitions/{}.png", slug(name)),
    }
}

fn stadium(name: &str, city: &str, country: &str) -> Stadium {
    Stadium {
        name: name.to_owned(),
        city: city.to_owned(),
        country: country.to_owned(),
    }
}

fn engagement(rating_average: f64, ratings: u32, reviews: u32, views: u32) -> Option<Engagement> {
    Some(Engagement {
        rating_average: Some(rating_average),
        ratings: Some(ratings),
        reviews: Some(reviews),
        views: Some(views),
        ..Default::default()
    })
}

fn slug(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// The catalog a fresh install starts with.
pub fn matches() -> Vec<Match> {
    vec![
        Match {
            id: 1,
            home_team: side("Argentina", "Argentina"),
            away_team: side("France", "France"),
            score: Score {
                home: 3,
                away: 3,
                extra_time: Some(true),
                penalties: Some(PenaltyScore { home: 4, away: 2 }),
            },
            date: "2022-12-18T15:00:00Z".to_owned(),
            competition: competition("FIFA World Cup"),
            stage: Some("Final".to_owned()),
            stadium: stadium("Lusail Stadium", "Lusail", "Qatar"),
            poster: "/posters/1.jpg".to_owned(),
            highlights: Some("https://www.youtube.com/watch?v=zhEWqfP6V_w".to_owned()),
            engagement: engagement(4.9, 120, 48, 950),
        },
        Match {
            id: 2,
            home_team: side("AC Milan", "Italy"),
            away_team: side("Liverpool", "England"),
            score: Score {
                home: 3,
                away: 3,
                extra_time: Some(true),
                penalties: Some(PenaltyScore { home: 2, away: 3 }),
            },
            date: "2005-05-25T18:45:00Z".to_owned(),
            competition: competition("UEFA Champions League"),
            stage: Some("Final".to_owned()),
            stadium: stadium("Atatürk Olympic Stadium", "Istanbul", "Turkey"),
            poster: "/posters/2.jpg".to_owned(),
            highlights: None,
            engagement: engagement(4.8, 85, 30, 610),
        },
        Match {
            id: 3,
            home_team: side("Brazil", "Brazil"),
            away_team: side("Germany", "Germany"),
            score: Score {
                home: 1,
                away: 7,
                ..Default::default()
            },
            date: "2014-07-08T20:00:00Z".to_owned(),
            competition: competition("FIFA World Cup"),
            stage: Some("Semi-final".to_owned()),
            stadium: stadium("Estádio Mineirão", "Belo Horizonte", "Brazil"),
            poster: "/posters/3.jpg".to_owned(),
            highlights: None,
            engagement: engagement(4.2, 64, 21, 540),
        },
        Match {
            id: 4,
            home_team: side("Manchester City", "England"),
            away_team: side("Queens Park Rangers", "England"),
            score: Score {
                home: 3,
                away: 2,
                ..Default::default()
            },
            date: "2012-05-13T14:00:00Z".to_owned(),
            competition: competition("Premier League"),
            stage: Some("Matchday 38".to_owned()),
            stadium: stadium("Etihad Stadium", "Manchester", "England"),
            poster: "/posters/4.jpg".to_owned(),
            highlights: None,
            engagement: engagement(4.7, 40, 12, 300),
        },
        Match {
            id: 5,
            home_team: side("Manchester United", "England"),
            away_team: side("Bayern Munich", "Germany"),
            score: Score {
                home: 2,
                away: 1,
                ..Default::default()
            },
            date: "1999-05-26T19:45:00Z".to_owned(),
            competition: competition("UEFA Champions League"),
            stage: Some("Final".to_owned()),
            stadium: stadium("Camp Nou", "Barcelona", "Spain"),
            poster: "/posters/5.jpg".to_owned(),
            highlights: None,
            engagement: engagement(4.6, 52, 9, 280),
        },
        Match {
            id: 6,
            home_team: side("Barcelona", "Spain"),
            away_team: side("Paris Saint-Germain", "France"),
            score: Score {
                home: 6,
                away: 1,
                ..Default::default()
            },
            date: "2017-03-08T19:45:00Z".to_owned(),
            competition: competition("UEFA Champions League"),
            stage: Some("Round of 16".to_owned()),
            stadium: stadium("Camp Nou", "Barcelona", "Spain"),
            poster: "/posters/6.jpg".to_owned(),
            highlights: None,
            engagement: None,
        },
    ]
}

/// Teams a user can follow.
pub fn teams() -> Vec<Team> {
    [
        (1, "Argentina", "Argentina"),
        (2, "France", "France"),
        (3, "Brazil", "Brazil"),
        (4, "Germany", "Germany"),
        (5, "Liverpool", "England"),
        (6, "AC Milan", "Italy"),
        (7, "Manchester City", "England"),
        (8, "Manchester United", "England"),
        (9, "Bayern Munich", "Germany"),
        (10, "Barcelona", "Spain"),
        (11, "Paris Saint-Germain", "France"),
        (12, "Real Madrid", "Spain"),
    ]
    .into_iter()
    .map(|(id, name, country)| Team {
        id,
        name: name.to_owned(),
        logo: format!("/logos/{}.png", slug(name)),
        country: country.to_owned(),
    })
    .collect()
}
