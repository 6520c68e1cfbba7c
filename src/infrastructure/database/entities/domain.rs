// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "domains")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub url: String,
    pub status: Option<String>,
    pub matched: Option<bool>,
    #[sea_orm(column_type = "Text", nullable)]
    pub frameworks: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub helpdesks: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub emails: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub contact_page_links: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub faq_page_links: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub data: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub html: Option<String>,
    pub started_at: Option<ChronoDateTimeWithTimeZone>,
    pub completed_at: Option<ChronoDateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
