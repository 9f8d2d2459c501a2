//! # Civic Flows
//!
//! Several users against one backend through RequestOrchestrator (cv-05):
//! projects, polls, votes and rewards, with the backend's permission rules
//! surfacing as `RemoteCall` errors.

#[cfg(test)]
mod tests {
    use cv_01_wire_codec::{format_amount, parse_amount};
    use cv_03_session_manager::IdentitySessionApi;
    use cv_05_request_orchestrator::{
        CivitasApi, NewSurvey, QuestionKind, SurveyQuestion, DEFAULT_TOKEN_DECIMALS,
    };
    use proptest::prelude::*;
    use shared_types::{ErrorKind, ProviderKind};

    use crate::integration::fixtures::{poll, project, World};

    #[tokio::test]
    async fn test_vote_and_reward_lifecycle_across_users() {
        let world = World::new();
        let alice = world.client();
        let bob = world.client();
        let carol = world.client();

        let alice_id = alice
            .app
            .session
            .login(ProviderKind::InternetIdentity)
            .await
            .unwrap();
        let bob_id = bob.app.session.login(ProviderKind::Plug).await.unwrap();

        let project_id = alice
            .app
            .orchestrator
            .create_project(&project("Benches"))
            .await
            .unwrap();
        let poll_id = alice
            .app
            .orchestrator
            .create_poll(&poll(&project_id, Some("1.5")))
            .await
            .unwrap();

        // Only the owner attaches polls
        let err = bob
            .app
            .orchestrator
            .create_poll(&poll(&project_id, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteCall);

        assert_eq!(
            bob.app.orchestrator.vote(&poll_id, 1).await.unwrap(),
            vec![0, 1, 0]
        );
        let err = bob.app.orchestrator.vote(&poll_id, 2).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteCall);
        assert_eq!(
            alice.app.orchestrator.vote(&poll_id, 1).await.unwrap(),
            vec![0, 2, 0]
        );

        // Anonymous readers see the tallies
        let seen = carol
            .app
            .orchestrator
            .get_poll(&poll_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(seen.tallies, vec![0, 2, 0]);
        assert_eq!(seen.creator, alice_id);
        assert_eq!(seen.reward_per_vote.as_deref(), Some("1.5"));

        let rewards = carol.app.orchestrator.list_rewards(&bob_id).await.unwrap();
        assert_eq!(rewards.len(), 1);
        let reward = &rewards[0];
        assert_eq!(reward.amount, "1.5");
        assert_eq!(reward.poll_id, poll_id);
        assert!(!reward.claimed);

        let err = alice
            .app
            .orchestrator
            .claim_reward(&reward.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteCall);

        assert_eq!(
            bob.app.orchestrator.claim_reward(&reward.id).await.unwrap(),
            "1.5"
        );
        let err = bob
            .app
            .orchestrator
            .claim_reward(&reward.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteCall);

        let rewards = bob.app.orchestrator.list_rewards(&bob_id).await.unwrap();
        assert!(rewards[0].claimed);
        assert_eq!(
            alice.app.orchestrator.list_rewards(&alice_id).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_closed_poll_refuses_votes() {
        let world = World::new();
        let owner = world.client();
        let voter = world.client();
        owner.app.session.login(ProviderKind::Nfid).await.unwrap();
        voter.app.session.login(ProviderKind::Plug).await.unwrap();

        let project_id = owner
            .app
            .orchestrator
            .create_project(&project("Market"))
            .await
            .unwrap();
        let poll_id = owner
            .app
            .orchestrator
            .create_poll(&poll(&project_id, None))
            .await
            .unwrap();

        world.replica.close_poll(poll_id.parse().unwrap());
        let err = voter.app.orchestrator.vote(&poll_id, 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteCall);
        assert!(voter
            .app
            .orchestrator
            .list_rewards(&voter.bridge.wallet_principal())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_surveys_filtered_by_project() {
        let world = World::new();
        let owner = world.client();
        owner
            .app
            .session
            .login(ProviderKind::InternetIdentity)
            .await
            .unwrap();

        let mut ids = Vec::new();
        for name in ["Library", "Playground"] {
            let project_id = owner
                .app
                .orchestrator
                .create_project(&project(name))
                .await
                .unwrap();
            let survey = NewSurvey {
                project_id: project_id.clone(),
                title: format!("{name} feedback"),
                questions: vec![
                    SurveyQuestion {
                        prompt: "What is missing?".to_string(),
                        kind: QuestionKind::Text,
                    },
                    SurveyQuestion {
                        prompt: "How often do you go?".to_string(),
                        kind: QuestionKind::SingleChoice(vec![
                            "Weekly".to_string(),
                            "Rarely".to_string(),
                        ]),
                    },
                    SurveyQuestion {
                        prompt: "Overall".to_string(),
                        kind: QuestionKind::Rating(5),
                    },
                ],
                closes_at: None,
                reward_pool: Some("100".to_string()),
            };
            owner.app.orchestrator.create_survey(&survey).await.unwrap();
            ids.push(project_id);
        }

        let all = owner.app.orchestrator.list_surveys(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let library = owner
            .app
            .orchestrator
            .list_surveys(Some(ids[0].as_str()))
            .await
            .unwrap();
        assert_eq!(library.len(), 1);
        assert_eq!(library[0].title, "Library feedback");
        assert_eq!(library[0].questions.len(), 3);
        assert_eq!(library[0].questions[2].kind, QuestionKind::Rating(5));
        assert_eq!(library[0].reward_pool.as_deref(), Some("100"));
        assert_eq!(library[0].closes_at, None);
    }

    #[tokio::test]
    async fn test_signed_out_writes_never_reach_backend() {
        let world = World::new();
        let client = world.client();

        let err = client
            .app
            .orchestrator
            .create_project(&project("Nope"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthRequired);

        // Validation is reported before the missing session
        let mut bad = poll("1", None);
        bad.options.truncate(1);
        let err = client.app.orchestrator.create_poll(&bad).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        assert_eq!(world.replica.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_ids_read_as_absent() {
        let world = World::new();
        let client = world.client();
        assert_eq!(client.app.orchestrator.get_project("999").await.unwrap(), None);
        assert_eq!(client.app.orchestrator.get_poll("999").await.unwrap(), None);

        let err = client.app.orchestrator.get_poll("-1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_reward_amount_survives_backend(whole in 1u64..1_000_000, frac in 0u64..100_000_000) {
            let text = format!("{whole}.{frac:08}");
            let canonical = format_amount(
                parse_amount(&text, DEFAULT_TOKEN_DECIMALS).unwrap(),
                DEFAULT_TOKEN_DECIMALS,
            )
            .unwrap();

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let seen = runtime.block_on(async {
                let world = World::new();
                let client = world.client();
                client.app.session.login(ProviderKind::Plug).await.unwrap();
                let project_id = client
                    .app
                    .orchestrator
                    .create_project(&project("Fund"))
                    .await
                    .unwrap();
                let poll_id = client
                    .app
                    .orchestrator
                    .create_poll(&poll(&project_id, Some(&text)))
                    .await
                    .unwrap();
                client
                    .app
                    .orchestrator
                    .get_poll(&poll_id)
                    .await
                    .unwrap()
                    .unwrap()
                    .reward_per_vote
            });
            prop_assert_eq!(seen, Some(canonical));
        }
    }
}
