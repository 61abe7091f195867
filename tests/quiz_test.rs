use darsy::quiz::{AnswerOutcome, MAX_TEAMS, MIN_TEAMS, TEAM_EMOJIS};
use darsy::{Certificate, Language, QuizProgress, QuizQuestion, QuizSession, TeamRoster};

fn question(text: &str, correct: usize) -> QuizQuestion {
    QuizQuestion {
        question: text.to_string(),
        options: vec!["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string()],
        correct_answer_index: correct,
        explanation: format!("{} is {}", text, correct),
    }
}

fn questions() -> Vec<QuizQuestion> {
    vec![question("Q1", 0), question("Q2", 1), question("Q3", 2)]
}

#[test]
fn test_individual_quiz_flow() {
    let mut session = QuizSession::individual(questions(), "Bees", Language::En, "Sara Ali")
        .expect("quiz should start");
    assert_eq!(session.total(), 3);
    assert_eq!(session.current_question().question, "Q1");

    let outcome = session.answer(0).unwrap().expect("first answer counts");
    assert_eq!(
        outcome,
        AnswerOutcome {
            correct: true,
            correct_index: 0,
            explanation: "Q1 is 0".to_string(),
        }
    );
    // A second answer to the same question is ignored
    assert!(session.answer(1).unwrap().is_none());
    assert_eq!(session.selected_option(), Some(0));
    assert_eq!(session.score(), 1);

    assert_eq!(session.next().unwrap(), QuizProgress::Question(1));
    assert!(!session.is_answered());
    let outcome = session.answer(3).unwrap().unwrap();
    assert!(!outcome.correct);
    assert_eq!(outcome.correct_index, 1);

    assert_eq!(session.next().unwrap(), QuizProgress::Question(2));
    session.answer(2).unwrap();
    assert_eq!(session.next().unwrap(), QuizProgress::Finished);
    assert!(session.is_finished());
    assert_eq!(session.score(), 2);
}

#[test]
fn test_next_requires_an_answer() {
    let mut session = QuizSession::individual(questions(), "Bees", Language::En, "Sara").unwrap();
    assert!(session.next().is_err());
    assert_eq!(session.current_index(), 0);
}

#[test]
fn test_out_of_range_option_is_rejected() {
    let mut session = QuizSession::individual(questions(), "Bees", Language::En, "Sara").unwrap();
    assert!(session.answer(4).is_err());
    assert!(!session.is_answered());
}

#[test]
fn test_quiz_needs_questions_and_name() {
    assert!(QuizSession::individual(Vec::new(), "Bees", Language::En, "Sara").is_err());
    assert!(QuizSession::individual(questions(), "Bees", Language::En, "  ").is_err());
}

#[test]
fn test_team_turns_rotate_and_scores_accumulate() {
    let roster = TeamRoster::new(Language::En);
    let mut session = QuizSession::team(questions(), "Bees", Language::En, roster).unwrap();

    assert_eq!(session.current_team().unwrap().name, "Butterflies Team");
    session.answer(0).unwrap();
    session.next().unwrap();

    assert_eq!(session.current_team().unwrap().name, "Stars Team");
    session.answer(1).unwrap();
    session.next().unwrap();

    // Back to the first team
    assert_eq!(session.current_team().unwrap().id, 1);
    session.answer(2).unwrap();
    assert_eq!(session.next().unwrap(), QuizProgress::Finished);

    let ranking = session.team_ranking();
    assert_eq!(ranking[0].name, "Butterflies Team");
    assert_eq!(ranking[0].score, 2);
    assert_eq!(ranking[1].score, 1);
    assert_eq!(session.winner().unwrap().id, 1);
    assert_eq!(session.score(), 3);
    assert!(session.student_name().is_none());
}

#[test]
fn test_team_ranking_ties_keep_roster_order() {
    let roster = TeamRoster::new(Language::En);
    let mut session = QuizSession::team(vec![question("Q1", 0)], "Bees", Language::En, roster).unwrap();
    session.answer(1).unwrap();
    session.next().unwrap();

    let ranking = session.team_ranking();
    assert_eq!(ranking[0].id, 1);
    assert_eq!(ranking[1].id, 2);
}

#[test]
fn test_roster_limits() {
    let mut roster = TeamRoster::new(Language::Ar);
    assert_eq!(roster.teams().len(), MIN_TEAMS);
    assert_eq!(roster.teams()[0].name, "فريق الفراشات");
    assert!(roster.remove_team(1).is_err());

    let third = roster.add_team().unwrap().clone();
    assert_eq!(third.name, "الفريق 3");
    assert_eq!(third.emoji, TEAM_EMOJIS[2]);
    roster.add_team().unwrap();
    assert_eq!(roster.teams().len(), MAX_TEAMS);
    assert!(roster.add_team().is_err());

    roster.remove_team(third.id).unwrap();
    assert_eq!(roster.teams().len(), 3);
    assert!(roster.remove_team(99).is_err());
}

#[test]
fn test_blank_team_name_blocks_start() {
    let mut roster = TeamRoster::new(Language::En);
    roster.rename(2, " ").unwrap();
    assert!(QuizSession::team(questions(), "Bees", Language::En, roster).is_err());
}

#[test]
fn test_certificate_from_finished_quiz() {
    let mut session = QuizSession::individual(questions(), "النحل", Language::Ar, "Sara Ali").unwrap();
    assert!(session.certificate("2024-05-01").is_err());

    for i in 0..3 {
        session.answer(i).unwrap();
        session.next().unwrap();
    }
    let certificate = session.certificate("2024-05-01").unwrap();
    assert_eq!(certificate.score, 3);
    assert_eq!(certificate.total, 3);
    assert_eq!(certificate.stars(), 3);
    assert_eq!(certificate.file_name(), "شهادة_Sara_Ali.pdf");
}

#[test]
fn test_team_quiz_has_no_certificate() {
    let roster = TeamRoster::new(Language::En);
    let mut session = QuizSession::team(vec![question("Q1", 0)], "Bees", Language::En, roster).unwrap();
    session.answer(0).unwrap();
    session.next().unwrap();
    assert!(session.certificate("2024-05-01").is_err());
}

fn certificate(score: u32, total: u32, language: Language) -> Certificate {
    Certificate {
        student_name: "Sara Ali".to_string(),
        lesson_title: "Bees & Flowers".to_string(),
        score,
        total,
        date: "2024-05-01".to_string(),
        language,
    }
}

#[test]
fn test_certificate_stars() {
    assert_eq!(certificate(0, 5, Language::En).stars(), 0);
    assert_eq!(certificate(1, 3, Language::En).stars(), 1);
    assert_eq!(certificate(2, 3, Language::En).stars(), 2);
    assert_eq!(certificate(5, 5, Language::En).stars(), 3);
    assert_eq!(certificate(0, 0, Language::En).stars(), 0);
    assert_eq!(certificate(10, 3, Language::En).stars(), 3);
    assert_eq!(certificate(u32::MAX, u32::MAX, Language::En).stars(), 3);
}

#[test]
fn test_share_links_are_percent_encoded() {
    let certificate = certificate(4, 5, Language::En);
    assert_eq!(certificate.file_name(), "certificate_Sara_Ali.pdf");

    let whatsapp = certificate.whatsapp_url();
    assert!(whatsapp.starts_with("https://wa.me/?text="));
    assert!(whatsapp.contains("Sara%20Ali"));
    assert!(whatsapp.contains("Bees%20%26%20Flowers"));
    assert!(!whatsapp.contains('+'));
    assert!(!whatsapp.contains(' '));

    let mailto = certificate.mailto_url();
    assert!(mailto.starts_with("mailto:?subject=Student%20result%3A%20Sara%20Ali"));
    assert!(mailto.contains("&body="));
    assert!(mailto.contains("4%20out%20of%205"));
}

#[test]
fn test_arabic_share_link() {
    let whatsapp = certificate(4, 5, Language::Ar).whatsapp_url();
    assert!(whatsapp.starts_with("https://wa.me/?text="));
    assert!(whatsapp.is_ascii());
}
