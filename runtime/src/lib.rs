// Copyright 2014 Pierre Talbot (IRCAM)

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Runtime pieces of the `pegrec` recognizer that do not depend on the grammar model: the
//! backtracking stream, positions, the transaction protocol implemented by host states, the
//! memoization table and the context given to semantic actions.

pub use position::*;
pub use stream::*;
pub use transaction::*;
pub use local_stack::*;
pub use action::*;

pub mod position;
pub mod stream;
pub mod transaction;
pub mod local_stack;
pub mod action;
