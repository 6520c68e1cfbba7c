// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod batch_scheduler_test;
pub mod helpers;
pub mod item_processor_test;
